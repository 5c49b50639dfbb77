use std::collections::HashMap;

/// Parse a urlencoded parameter string (`a=1&b=two`) into a map.
///
/// Handles URL decoding. Multiple values for the same key are not
/// supported (only the last is kept). Used for the login form body.
pub fn parse_params(raw: &str) -> HashMap<String, String> {
    let mut params = HashMap::new();

    for param in raw.split('&') {
        if param.is_empty() {
            continue;
        }
        if let Some(eq_idx) = param.find('=') {
            let key = &param[..eq_idx];
            let encoded_value = &param[eq_idx + 1..];
            let decoded = urlencoding::decode(encoded_value)
                .unwrap_or(std::borrow::Cow::Borrowed(encoded_value))
                .to_string();
            params.insert(key.to_string(), decoded);
        } else {
            // Flag parameter without value
            params.insert(param.to_string(), String::new());
        }
    }

    params
}

/// Parse a urlencoded request body into a parameter map.
pub fn parse_form(body: &[u8]) -> HashMap<String, String> {
    parse_params(std::str::from_utf8(body).unwrap_or_default())
}
