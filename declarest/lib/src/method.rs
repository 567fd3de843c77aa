//! HTTP method types for REST actions.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use strum::{Display, EnumIter, EnumString};

/// HTTP methods an action can be bound to.
///
/// Parsing is case-insensitive so configuration files may write `get` or
/// `GET`; the canonical form is upper case.
///
/// ## Examples
///
/// ```rust
/// use declarest::RestMethod;
///
/// let method = RestMethod::Get;
/// assert!(!method.has_body());
///
/// let parsed: RestMethod = "patch".parse().unwrap();
/// assert_eq!(parsed, RestMethod::Patch);
/// assert!(parsed.has_body());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumIter, EnumString)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum RestMethod {
    /// HTTP GET - Retrieve a resource.
    #[default]
    Get,
    /// HTTP POST - Create a resource or trigger an action.
    Post,
    /// HTTP PUT - Replace a resource entirely.
    Put,
    /// HTTP PATCH - Partially update a resource.
    Patch,
    /// HTTP DELETE - Remove a resource.
    Delete,
    /// HTTP HEAD - Retrieve headers only.
    Head,
    /// HTTP OPTIONS - Query supported methods.
    Options,
}

impl RestMethod {
    /// Returns `true` if requests with this method carry a body.
    ///
    /// POST, PUT, and PATCH send the request payload as the body; every
    /// other method ignores it.
    pub fn has_body(&self) -> bool {
        matches!(self, Self::Post | Self::Put | Self::Patch)
    }

    /// Converts to the equivalent `reqwest::Method`.
    pub fn to_reqwest(self) -> reqwest::Method {
        match self {
            Self::Get => reqwest::Method::GET,
            Self::Post => reqwest::Method::POST,
            Self::Put => reqwest::Method::PUT,
            Self::Patch => reqwest::Method::PATCH,
            Self::Delete => reqwest::Method::DELETE,
            Self::Head => reqwest::Method::HEAD,
            Self::Options => reqwest::Method::OPTIONS,
        }
    }
}

impl From<RestMethod> for reqwest::Method {
    fn from(method: RestMethod) -> Self {
        method.to_reqwest()
    }
}

impl Serialize for RestMethod {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for RestMethod {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse()
            .map_err(|_| serde::de::Error::custom(format!("unknown HTTP method: {raw}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_display() {
        assert_eq!(RestMethod::Get.to_string(), "GET");
        assert_eq!(RestMethod::Post.to_string(), "POST");
        assert_eq!(RestMethod::Delete.to_string(), "DELETE");
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("GET".parse::<RestMethod>().unwrap(), RestMethod::Get);
        assert_eq!("post".parse::<RestMethod>().unwrap(), RestMethod::Post);
        assert_eq!("Delete".parse::<RestMethod>().unwrap(), RestMethod::Delete);
        assert!("FETCH".parse::<RestMethod>().is_err());
    }

    #[test]
    fn test_has_body() {
        assert!(!RestMethod::Get.has_body());
        assert!(RestMethod::Post.has_body());
        assert!(RestMethod::Put.has_body());
        assert!(RestMethod::Patch.has_body());
        assert!(!RestMethod::Delete.has_body());
        assert!(!RestMethod::Head.has_body());
    }

    #[test]
    fn test_default_is_get() {
        assert_eq!(RestMethod::default(), RestMethod::Get);
    }

    #[test]
    fn test_serde_round_trip() {
        let json = serde_json::to_string(&RestMethod::Put).unwrap();
        assert_eq!(json, "\"PUT\"");
        let parsed: RestMethod = serde_json::from_str("\"patch\"").unwrap();
        assert_eq!(parsed, RestMethod::Patch);
    }

    #[test]
    fn test_enum_iteration() {
        let methods: Vec<_> = RestMethod::iter().collect();
        assert_eq!(methods.len(), 7);
    }

    #[test]
    fn test_to_reqwest() {
        assert_eq!(RestMethod::Get.to_reqwest(), reqwest::Method::GET);
        assert_eq!(RestMethod::Post.to_reqwest(), reqwest::Method::POST);
    }
}
