use crate::error::Result;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;

/// Width and indent budget for spooled JSON documents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JsonLayout {
    pub width: usize,
    pub indent: usize,
}

impl JsonLayout {
    pub fn new(width: usize, indent: usize) -> Self {
        Self { width, indent }
    }
}

impl Default for JsonLayout {
    fn default() -> Self {
        Self::new(
            crate::utils::constants::DEFAULT_JSON_WIDTH,
            crate::utils::constants::DEFAULT_JSON_INDENT,
        )
    }
}

/// Pretty-print `value`, then fold runs of sibling lines onto one line while the
/// result stays within `layout.width`.
///
/// A line is folded onto its predecessor when it sits at the same depth, or at
/// most one indent deeper, and the predecessor does not close a nested array or
/// object. With a zero width or indent the output is plain compact JSON.
pub fn compact_json<T: Serialize>(value: &T, layout: JsonLayout) -> Result<String> {
    if layout.width == 0 || layout.indent == 0 {
        return Ok(serde_json::to_string(value)?);
    }

    let indent = " ".repeat(layout.indent);
    let mut buffer = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(
        &mut buffer,
        PrettyFormatter::with_indent(indent.as_bytes()),
    );
    value.serialize(&mut serializer)?;
    let pretty = String::from_utf8_lossy(&buffer);

    let mut lines = pretty.lines();
    let mut folded: Vec<String> = match lines.next() {
        Some(first) => vec![first.to_string()],
        None => return Ok(String::new()),
    };
    let mut previous_depth = 0usize;

    for line in lines {
        let depth = line.len() - line.trim_start_matches(' ').len();

        if depth > 0 && previous_depth > 0 {
            let sibling = depth == previous_depth
                || (depth > previous_depth && depth - previous_depth <= layout.indent);

            if let Some(last) = folded.last_mut() {
                let closes_nested = {
                    let tail = last.trim_end();
                    tail.ends_with("],") || tail.ends_with("},")
                };
                if sibling && !closes_nested && line.len() + last.len() - depth <= layout.width {
                    last.push_str(&line[depth..]);
                    continue;
                }
            }
        }

        folded.push(line.to_string());
        previous_depth = depth;
    }

    Ok(folded.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[test]
    fn test_long_arrays_fold_within_width() {
        let numbers: Vec<u32> = (0..256).collect();
        let value = json!({ "bar": numbers, "baz": numbers, "foo": numbers });

        let text = compact_json(&value, JsonLayout::new(80, 2)).unwrap();

        assert!(text.lines().all(|line| line.len() <= 80));
        assert!(text.lines().count() < 3 * 256);

        let back: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(back, value);
    }

    #[test]
    fn test_nested_closers_start_new_lines() {
        let value = json!({ "a": [1, 2], "b": { "c": 3 }, "d": 4 });
        let text = compact_json(&value, JsonLayout::new(200, 2)).unwrap();

        for line in text.lines() {
            let closer = line.find("],").or_else(|| line.find("},"));
            if let Some(pos) = closer {
                assert_eq!(pos + 2, line.trim_end().len(), "closer must end its line: {line}");
            }
        }
        let back: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(back, value);
    }

    #[test]
    fn test_zero_width_is_plain_compact() {
        let value = json!({ "a": [1, 2, 3] });
        let text = compact_json(&value, JsonLayout::new(0, 2)).unwrap();
        assert_eq!(text, r#"{"a":[1,2,3]}"#);
    }
}
