use ::serde::Deserialize;
use ::serde::Serialize;

/// The field name the event payload is sent under.
pub const EVENT_DATA_FIELD: &str = "__event_data__";

/// The query parameter naming the event to execute.
pub const EXECUTE_EVENT_QUERY_PARAM: &str = "__execute_event__";

/// Identifies the event function to run on the server, along with its parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventFuncId {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<String>,
}

impl EventFuncId {
    pub fn is_empty(&self) -> bool {
        self.id.is_empty() && self.params.is_empty()
    }
}

///
/// The state of the form control which raised the event.
///
/// Each field is only used by some controls,
/// and is left out of the payload when it is unset.
///
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Event {
    /// For checkboxes.
    #[serde(skip_serializing_if = "is_false")]
    pub checked: bool,

    /// For date pickers.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub from: String,

    /// For date pickers.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub to: String,

    /// For inputs, and date pickers.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub value: String,
}

impl Event {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// The payload sent in the [`EVENT_DATA_FIELD`] of an event request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventDescriptor {
    #[serde(rename = "eventFuncId", skip_serializing_if = "EventFuncId::is_empty")]
    pub event_func_id: EventFuncId,

    #[serde(skip_serializing_if = "Event::is_empty")]
    pub event: Event,
}

fn is_false(value: &bool) -> bool {
    !*value
}

#[cfg(test)]
mod test_serialize {
    use super::*;
    use ::pretty_assertions::assert_eq;
    use ::serde_json::json;

    #[test]
    fn it_should_serialize_empty_descriptor_as_empty_object() {
        let output = ::serde_json::to_value(EventDescriptor::default()).unwrap();

        assert_eq!(output, json!({}));
    }

    #[test]
    fn it_should_serialize_event_func_id() {
        let descriptor = EventDescriptor {
            event_func_id: EventFuncId {
                id: "save".to_string(),
                params: vec!["x".to_string(), "y".to_string()],
            },
            event: Event::default(),
        };

        let output = ::serde_json::to_value(descriptor).unwrap();

        assert_eq!(
            output,
            json!({
                "eventFuncId": {
                    "id": "save",
                    "params": ["x", "y"],
                },
            })
        );
    }

    #[test]
    fn it_should_only_serialize_set_event_fields() {
        let descriptor = EventDescriptor {
            event_func_id: EventFuncId::default(),
            event: Event {
                checked: true,
                value: "blue".to_string(),
                ..Event::default()
            },
        };

        let output = ::serde_json::to_value(descriptor).unwrap();

        assert_eq!(
            output,
            json!({
                "event": {
                    "checked": true,
                    "value": "blue",
                },
            })
        );
    }
}

#[cfg(test)]
mod test_deserialize {
    use super::*;

    #[test]
    fn it_should_deserialize_with_missing_fields() {
        let raw = r#"{"eventFuncId":{"id":"save"},"event":{"from":"2024-01-01","to":"2024-02-01"}}"#;

        let descriptor: EventDescriptor = ::serde_json::from_str(raw).unwrap();

        assert_eq!(descriptor.event_func_id.id, "save");
        assert!(descriptor.event_func_id.params.is_empty());
        assert_eq!(descriptor.event.from, "2024-01-01");
        assert_eq!(descriptor.event.to, "2024-02-01");
        assert!(!descriptor.event.checked);
    }
}
