//! DTOs for decoding Yandex geocoder JSON responses.
//!
//! Only the path down to `GeoObject.Point.pos` is modelled. `pos` holds
//! longitude then latitude separated by whitespace. The first feature member
//! is authoritative; later members are kept only when they parse cleanly.

use serde::Deserialize;

use crate::domain::Coordinates;
use crate::domain::ports::GeocodeCandidate;

#[derive(Debug, Deserialize)]
pub(super) struct GeocoderResponseDto {
    response: GeocoderBodyDto,
}

#[derive(Debug, Deserialize)]
struct GeocoderBodyDto {
    #[serde(rename = "GeoObjectCollection")]
    collection: GeoObjectCollectionDto,
}

#[derive(Debug, Deserialize)]
struct GeoObjectCollectionDto {
    #[serde(rename = "featureMember", default)]
    feature_member: Vec<FeatureMemberDto>,
}

#[derive(Debug, Deserialize)]
struct FeatureMemberDto {
    #[serde(rename = "GeoObject", default)]
    geo_object: Option<GeoObjectDto>,
}

#[derive(Debug, Deserialize)]
struct GeoObjectDto {
    #[serde(rename = "Point", default)]
    point: Option<PointDto>,
}

#[derive(Debug, Deserialize)]
struct PointDto {
    #[serde(default)]
    pos: Option<String>,
}

impl FeatureMemberDto {
    fn pos(&self) -> Option<&str> {
        self.geo_object
            .as_ref()
            .and_then(|object| object.point.as_ref())
            .and_then(|point| point.pos.as_deref())
    }
}

impl GeocoderResponseDto {
    /// Convert feature members into candidates, in response order.
    ///
    /// A malformed first member fails the whole response. Malformed later
    /// members are dropped.
    pub(super) fn into_candidates(self) -> Result<Vec<GeocodeCandidate>, String> {
        let mut members = self.response.collection.feature_member.into_iter();
        let Some(first) = members.next() else {
            return Ok(Vec::new());
        };
        let first_pos = first
            .pos()
            .ok_or_else(|| "first feature member has no `Point.pos`".to_owned())?;
        let mut candidates = vec![parse_pos(first_pos)?];
        candidates.extend(
            members.filter_map(|member| member.pos().and_then(|pos| parse_pos(pos).ok())),
        );
        Ok(candidates)
    }
}

fn parse_pos(pos: &str) -> Result<GeocodeCandidate, String> {
    let mut parts = pos.split_whitespace();
    let (Some(lon), Some(lat), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(format!("position `{pos}` must hold exactly two numbers"));
    };
    let longitude: f64 = lon
        .parse()
        .map_err(|error| format!("invalid longitude `{lon}`: {error}"))?;
    let latitude: f64 = lat
        .parse()
        .map_err(|error| format!("invalid latitude `{lat}`: {error}"))?;
    let coordinates =
        Coordinates::new(latitude, longitude).map_err(|error| format!("position `{pos}`: {error}"))?;
    Ok(GeocodeCandidate { coordinates })
}
