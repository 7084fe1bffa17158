//! Helper macro for declaring port error enums.
//!
//! Each variant gets a snake_case constructor whose parameters accept
//! `impl Into<T>`, so adapters can pass `&str` or formatted strings directly.

macro_rules! define_port_error {
    (@ctor $variant:ident) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]() -> Self {
                Self::$variant
            }
        }
    };

    (@ctor $variant:ident { $($field:ident : $ty:ty),* $(,)? }) => {
        define_port_error!(@ctor_impl $variant () () $( $field : $ty, )*);
    };

    (@ctor_impl $variant:ident ($($params:tt)*) ($($inits:tt)*) ) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]($($params)*) -> Self {
                Self::$variant { $($inits)* }
            }
        }
    };

    (@ctor_impl $variant:ident ($($params:tt)*) ($($inits:tt)*) $field:ident : $ty:ty, $($rest:tt)*) => {
        define_port_error!(
            @ctor_impl
            $variant
            ($($params)* $field: impl Into<$ty>,)
            ($($inits)* $field: $field.into(),)
            $($rest)*
        );
    };
    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $( { $($field:ident : $ty:ty),* $(,)? } )? => $message:expr
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant $( { $($field : $ty),* } )?,
            )*
        }

        impl $name {
            $(
                define_port_error!(@ctor $variant $( { $($field : $ty),* } )?);
            )*
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    //! Constructor generation for port error enums.
    define_port_error! {
        pub enum ProbeError {
            Unreachable => "probe unreachable",
            Status { status: u16, body: String } => "probe status {status}: {body}",
            Decode { message: String } => "probe decode failed: {message}",
        }
    }

    #[test]
    fn unit_variants_get_nullary_constructors() {
        assert_eq!(ProbeError::unreachable(), ProbeError::Unreachable);
        assert_eq!(ProbeError::unreachable().to_string(), "probe unreachable");
    }

    #[test]
    fn string_fields_accept_borrowed_text() {
        let err = ProbeError::decode("missing pos");
        assert_eq!(err.to_string(), "probe decode failed: missing pos");
    }

    #[test]
    fn mixed_fields_keep_their_types() {
        let err = ProbeError::status(503_u16, format!("busy {}", 1));
        assert_eq!(err.to_string(), "probe status 503: busy 1");
    }
}
