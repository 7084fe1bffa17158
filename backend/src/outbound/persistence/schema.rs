//! Diesel table definitions for the dispatch schema.
//!
//! Must match `backend/migrations`. Order lines are read with raw SQL
//! because their prices are stored as `NUMERIC` and converted to minor
//! units in the query, so `order_items` is not declared here.

diesel::table! {
    /// Geocoding cache keyed by the raw address text.
    geocoded_addresses (id) {
        id -> Int8,
        /// Unique raw address as entered.
        raw_address -> Varchar,
        lat -> Nullable<Float8>,
        lng -> Nullable<Float8>,
        provider -> Varchar,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    restaurants (id) {
        id -> Int8,
        name -> Varchar,
        address -> Varchar,
    }
}

diesel::table! {
    products (id) {
        id -> Int8,
        name -> Varchar,
    }
}

diesel::table! {
    /// Which products each restaurant offers and whether they are in stock.
    restaurant_menu_items (id) {
        id -> Int8,
        restaurant_id -> Int8,
        product_id -> Int8,
        availability -> Bool,
    }
}

diesel::table! {
    orders (id) {
        id -> Int8,
        firstname -> Varchar,
        lastname -> Varchar,
        phonenumber -> Varchar,
        address -> Varchar,
        status -> Varchar,
        payment_method -> Nullable<Varchar>,
        comment -> Text,
        cooking_restaurant_id -> Nullable<Int8>,
    }
}

diesel::joinable!(restaurant_menu_items -> restaurants (restaurant_id));
diesel::joinable!(restaurant_menu_items -> products (product_id));

diesel::allow_tables_to_appear_in_same_query!(
    geocoded_addresses,
    orders,
    products,
    restaurant_menu_items,
    restaurants,
);
