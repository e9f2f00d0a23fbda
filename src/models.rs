use serde::{Deserialize, Serialize};

/// Proxy protocol enum
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProxyType {
    #[default]
    Socks5,
    Socks4,
    Http,
    Mtproto,
}

impl ProxyType {
    pub fn as_str(&self) -> &str {
        match self {
            ProxyType::Socks5 => "socks5",
            ProxyType::Socks4 => "socks4",
            ProxyType::Http => "http",
            ProxyType::Mtproto => "mtproto",
        }
    }

    pub fn next(&self) -> ProxyType {
        match self {
            ProxyType::Socks5 => ProxyType::Socks4,
            ProxyType::Socks4 => ProxyType::Http,
            ProxyType::Http => ProxyType::Mtproto,
            ProxyType::Mtproto => ProxyType::Socks5,
        }
    }
}

/// A messaging account
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub api_id: String,
    pub api_hash: String,
    pub phone_number: String,
    #[serde(default)]
    pub session_file: String,
    /// Reference to a Proxy id; cleared when the proxy is deleted
    #[serde(default)]
    pub proxy: Option<String>,
}

/// A proxy server definition
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Proxy {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: ProxyType,
    pub host: String,
    pub port: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// A posting time of day
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostTime {
    pub hour: u8,
    pub minute: u8,
}

impl PostTime {
    /// Zero-padded `HH:MM` label
    pub fn label(&self) -> String {
        format!("{:02}:{:02}", self.hour, self.minute)
    }
}

impl Default for PostTime {
    fn default() -> Self {
        PostTime { hour: 9, minute: 0 }
    }
}

/// A scheduled post definition targeting a chat or channel
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chat {
    #[serde(default)]
    pub id: String,
    pub name: String,
    /// Canonical target id, see [`crate::chat_id::normalize_chat_id`]
    pub chat_id: String,
    pub message: String,
    #[serde(default)]
    pub send_photo: bool,
    #[serde(default)]
    pub photo_url: String,
    /// Reference to an Account id; cleared when the account is deleted
    #[serde(default)]
    pub account_id: Option<String>,
    /// Posting times, at least one required at save time
    #[serde(default)]
    pub times: Vec<PostTime>,
}

/// Default session file name derived from the account name
pub fn default_session_file(account_name: &str) -> String {
    let base: String = account_name
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_");
    format!("{}.session", base)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_session_file() {
        assert_eq!(default_session_file("My Account"), "my_account.session");
        assert_eq!(default_session_file("  Spaced   Out "), "spaced_out.session");
    }

    #[test]
    fn test_post_time_label_pads() {
        assert_eq!(PostTime { hour: 9, minute: 5 }.label(), "09:05");
        assert_eq!(PostTime { hour: 23, minute: 59 }.label(), "23:59");
    }

    #[test]
    fn test_proxy_type_cycles_through_all() {
        let start = ProxyType::Socks5;
        let mut t = start.next();
        let mut seen = 1;
        while t != start {
            t = t.next();
            seen += 1;
        }
        assert_eq!(seen, 4);
    }

    #[test]
    fn test_account_snapshot_field_names() {
        let account = Account {
            id: "a1".into(),
            name: "Main".into(),
            api_id: "12345".into(),
            api_hash: "abcdef".into(),
            phone_number: "+100200300".into(),
            session_file: "main.session".into(),
            proxy: None,
        };
        let json = serde_json::to_value(&account).unwrap();
        assert_eq!(json["apiId"], "12345");
        assert_eq!(json["phoneNumber"], "+100200300");
        assert_eq!(json["sessionFile"], "main.session");
    }

    #[test]
    fn test_chat_deserializes_with_missing_optionals() {
        let chat: Chat = serde_json::from_str(
            r#"{"name":"News","chatId":"@news","message":"hi"}"#,
        )
        .unwrap();
        assert_eq!(chat.id, "");
        assert!(!chat.send_photo);
        assert!(chat.account_id.is_none());
        assert!(chat.times.is_empty());
    }

    #[test]
    fn test_proxy_type_round_trips_lowercase() {
        let proxy: Proxy = serde_json::from_str(
            r#"{"name":"p","type":"mtproto","host":"1.2.3.4","port":"443"}"#,
        )
        .unwrap();
        assert_eq!(proxy.kind, ProxyType::Mtproto);
        let json = serde_json::to_value(&proxy).unwrap();
        assert_eq!(json["type"], "mtproto");
    }
}
