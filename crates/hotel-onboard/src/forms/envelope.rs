use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

/// JSON body that may or may not be wrapped in a `data` member.
///
/// Dashboard clients send both shapes; [`ApiEnvelope::into_inner`] is the one place the
/// wrapper is peeled off so handlers only ever see the payload type. An object carrying a
/// `data` key is always read as the wrapped shape, so a bad payload inside it is an error
/// rather than a bare body with every field defaulted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ApiEnvelope<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> ApiEnvelope<T> {
    pub fn wrap(data: T) -> Self {
        Self::Wrapped { data }
    }

    pub fn into_inner(self) -> T {
        match self {
            Self::Wrapped { data } | Self::Bare(data) => data,
        }
    }
}

impl<'de, T> Deserialize<'de> for ApiEnvelope<T>
where
    T: DeserializeOwned,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let mut value = serde_json::Value::deserialize(deserializer)?;
        let wrapped = value
            .as_object_mut()
            .and_then(|object| object.remove("data"));

        match wrapped {
            Some(data) => serde_json::from_value(data).map(|data| Self::Wrapped { data }),
            None => serde_json::from_value(value).map(Self::Bare),
        }
        .map_err(serde::de::Error::custom)
    }
}
