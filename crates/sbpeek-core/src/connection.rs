//! SAS connection string parsing and queue name resolution.
//!
//! Nothing in here touches the network.

use crate::error::{Error, Result};

/// The parts of a `Key=Value;Key=Value` SAS connection string this tool
/// understands. Unknown keys and segments without `=` are dropped.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConnectionDescriptor {
    pub endpoint: Option<String>,
    pub shared_access_key_name: Option<String>,
    pub shared_access_key: Option<String>,
    pub entity_path: Option<String>,
}

impl ConnectionDescriptor {
    /// Splits on `;`, then on the first `=` of each segment.
    ///
    /// # Example
    ///
    /// ```
    /// use sbpeek::ConnectionDescriptor;
    ///
    /// let cs = ConnectionDescriptor::parse(
    ///     "Endpoint=sb://x.servicebus.windows.net/;SharedAccessKeyName=read;SharedAccessKey=K=;EntityPath=q1",
    /// );
    /// assert_eq!(cs.entity_path.as_deref(), Some("q1"));
    /// assert_eq!(cs.shared_access_key.as_deref(), Some("K="));
    /// ```
    pub fn parse(connection_string: &str) -> Self {
        let mut descriptor = Self::default();

        for segment in connection_string.trim().split(';') {
            let Some((key, value)) = segment.split_once('=') else {
                continue;
            };

            let value = value.trim().to_string();
            match key.trim() {
                "Endpoint" => descriptor.endpoint = Some(value),
                "SharedAccessKeyName" => descriptor.shared_access_key_name = Some(value),
                "SharedAccessKey" => descriptor.shared_access_key = Some(value),
                "EntityPath" => descriptor.entity_path = Some(value),
                _ => {}
            }
        }

        // `EntityPath=` carries no queue name
        descriptor.entity_path = descriptor.entity_path.filter(|p| !p.is_empty());
        descriptor
    }

    /// Connection string for the namespace alone, without `EntityPath`.
    ///
    /// Fails with [`Error::Authentication`] when any credential part is
    /// missing, since the broker could never accept it.
    pub fn namespace_connection_string(&self) -> Result<String> {
        let endpoint = required(&self.endpoint, "Endpoint")?;
        let key_name = required(&self.shared_access_key_name, "SharedAccessKeyName")?;
        let key = required(&self.shared_access_key, "SharedAccessKey")?;

        Ok(format!(
            "Endpoint={endpoint};SharedAccessKeyName={key_name};SharedAccessKey={key}"
        ))
    }

    /// Picks the queue to peek: an explicit `--queue` wins over `EntityPath`.
    pub fn resolve_queue(&self, queue: Option<&str>) -> Result<String> {
        queue
            .filter(|q| !q.is_empty())
            .or(self.entity_path.as_deref())
            .map(str::to_string)
            .ok_or_else(|| {
                Error::Configuration(
                    "no queue specified. Pass --queue or include EntityPath in the connection string"
                        .to_string(),
                )
            })
    }
}

fn required<'a>(part: &'a Option<String>, key: &str) -> Result<&'a str> {
    match part.as_deref() {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(Error::Authentication(format!(
            "connection string missing required part: {key}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = "Endpoint=sb://x.servicebus.windows.net/;SharedAccessKeyName=read;SharedAccessKey=K;EntityPath=q1";

    #[test]
    fn parses_all_known_parts() {
        let cs = ConnectionDescriptor::parse(FULL);
        assert_eq!(
            cs,
            ConnectionDescriptor {
                endpoint: Some("sb://x.servicebus.windows.net/".into()),
                shared_access_key_name: Some("read".into()),
                shared_access_key: Some("K".into()),
                entity_path: Some("q1".into()),
            }
        );
    }

    #[test]
    fn ignores_unknown_and_malformed_segments() {
        let cs = ConnectionDescriptor::parse(
            " Endpoint = sb://x/ ;garbage;;UseDevelopmentEmulator=true;SharedAccessKey=abc==; ",
        );
        assert_eq!(cs.endpoint.as_deref(), Some("sb://x/"));
        assert_eq!(cs.shared_access_key.as_deref(), Some("abc=="));
        assert_eq!(cs.shared_access_key_name, None);
        assert_eq!(cs.entity_path, None);
    }

    #[test]
    fn namespace_string_drops_entity_path() {
        let cs = ConnectionDescriptor::parse(FULL);
        assert_eq!(
            cs.namespace_connection_string().unwrap(),
            "Endpoint=sb://x.servicebus.windows.net/;SharedAccessKeyName=read;SharedAccessKey=K"
        );
    }

    #[test]
    fn missing_key_is_an_authentication_error() {
        let cs = ConnectionDescriptor::parse("Endpoint=sb://x/;SharedAccessKeyName=read");
        let err = cs.namespace_connection_string().unwrap_err();
        assert_eq!(
            err,
            Error::Authentication("connection string missing required part: SharedAccessKey".into())
        );
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn resolve_prefers_explicit_queue() {
        let cs = ConnectionDescriptor::parse(FULL);
        assert_eq!(cs.resolve_queue(None).unwrap(), "q1");
        assert_eq!(cs.resolve_queue(Some("other")).unwrap(), "other");
    }

    #[test]
    fn resolve_without_any_queue_fails() {
        let cs = ConnectionDescriptor::parse("Endpoint=sb://x/;EntityPath=");
        let err = cs.resolve_queue(None).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
        assert_eq!(err.exit_code(), 1);
    }
}
