use std::collections::HashMap;

/// Parse an `application/x-www-form-urlencoded` body, keeping every value of
/// repeated keys (checkbox lists such as `instance_ids`).
pub fn parse_urlencoded_body(body: &[u8]) -> HashMap<String, Vec<String>> {
    let mut map: HashMap<String, Vec<String>> = HashMap::new();
    let raw = String::from_utf8_lossy(body);
    for pair in raw.split('&') {
        if pair.is_empty() { continue; }
        let mut parts = pair.splitn(2, '=');
        let key = decode_component(parts.next().unwrap_or(""));
        let val = decode_component(parts.next().unwrap_or(""));
        map.entry(key).or_default().push(val);
    }
    map
}

/// First value for `key`, or an empty string.
pub fn first_value(form: &HashMap<String, Vec<String>>, key: &str) -> String {
    form.get(key)
        .and_then(|v| v.first())
        .cloned()
        .unwrap_or_default()
}

fn decode_component(raw: &str) -> String {
    // HTML forms encode spaces as '+'
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|s| s.into_owned())
        .unwrap_or(spaced)
}
