//! Alert message templates.
//!
//! Templates use `$name` or `${name}` placeholders; `$$` is a literal `$`.
//! Only `hex`, `flight`, `distance` and `altitude` exist. Anything else is a
//! `TemplateError`, never passed through into the rendered text.

use thiserror::Error;

use crate::alert::{AircraftHit, AlertRecord};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("unknown placeholder '${name}' (expected hex, flight, distance, or altitude)")]
    UnknownPlaceholder { name: String },
    #[error("invalid placeholder at byte {position}")]
    InvalidPlaceholder { position: usize },
}

/// Values a template can reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    Hex,
    Flight,
    Distance,
    Altitude,
}

impl Placeholder {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "hex" => Some(Placeholder::Hex),
            "flight" => Some(Placeholder::Flight),
            "distance" => Some(Placeholder::Distance),
            "altitude" => Some(Placeholder::Altitude),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Segment {
    Literal(String),
    Field(Placeholder),
}

/// A parsed, validated template.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    segments: Vec<Segment>,
}

fn is_ident_start(b: u8) -> bool {
    b == b'_' || b.is_ascii_alphabetic()
}

fn is_ident_char(b: u8) -> bool {
    b == b'_' || b.is_ascii_alphanumeric()
}

fn placeholder(name: &str) -> Result<Placeholder, TemplateError> {
    Placeholder::from_name(name).ok_or_else(|| TemplateError::UnknownPlaceholder {
        name: name.to_string(),
    })
}

impl Template {
    pub fn parse(text: &str) -> Result<Self, TemplateError> {
        let bytes = text.as_bytes();
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut start = 0;
        let mut i = 0;

        while i < bytes.len() {
            if bytes[i] != b'$' {
                i += 1;
                continue;
            }
            literal.push_str(&text[start..i]);
            let dollar = i;
            i += 1;

            match bytes.get(i).copied() {
                Some(b'$') => {
                    literal.push('$');
                    i += 1;
                }
                Some(b'{') => {
                    let name_start = i + 1;
                    let close = text[name_start..]
                        .find('}')
                        .map(|off| name_start + off)
                        .ok_or(TemplateError::InvalidPlaceholder { position: dollar })?;
                    let name = &text[name_start..close];
                    let valid = name.bytes().next().is_some_and(is_ident_start)
                        && name.bytes().all(is_ident_char);
                    if !valid {
                        return Err(TemplateError::InvalidPlaceholder { position: dollar });
                    }
                    let field = placeholder(name)?;
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Field(field));
                    i = close + 1;
                }
                Some(b) if is_ident_start(b) => {
                    let name_start = i;
                    while i < bytes.len() && is_ident_char(bytes[i]) {
                        i += 1;
                    }
                    let field = placeholder(&text[name_start..i])?;
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Field(field));
                }
                _ => return Err(TemplateError::InvalidPlaceholder { position: dollar }),
            }
            start = i;
        }

        literal.push_str(&text[start..]);
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }
        Ok(Template { segments })
    }

    /// Expand the template for one matched aircraft.
    pub fn render(&self, hex: &str, hit: &AircraftHit) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(s) => out.push_str(s),
                Segment::Field(Placeholder::Hex) => out.push_str(hex),
                Segment::Field(Placeholder::Flight) => out.push_str(&hit.flight),
                Segment::Field(Placeholder::Distance) => out.push_str(&hit.distance.to_string()),
                Segment::Field(Placeholder::Altitude) => out.push_str(&hit.altitude.to_string()),
            }
        }
        out
    }
}

/// Parse and render `template` in one step.
pub fn render(template: &str, hex: &str, hit: &AircraftHit) -> Result<String, TemplateError> {
    Ok(Template::parse(template)?.render(hex, hit))
}

/// A rendered message for one aircraft, ready for a target group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub group: String,
    pub hex: String,
    pub title: String,
    pub body: String,
}

/// Render title and body for every aircraft in one alert record.
///
/// Fails on the first bad template; the caller reports the group and moves
/// on to the next one.
pub fn notifications_for(
    group: &str,
    title: &str,
    body: &str,
    record: &AlertRecord,
) -> Result<Vec<Notification>, TemplateError> {
    let title = Template::parse(title)?;
    let body = Template::parse(body)?;

    Ok(record
        .aircraft
        .iter()
        .map(|(hex, hit)| Notification {
            group: group.to_string(),
            hex: hex.clone(),
            title: title.render(hex, hit),
            body: body.render(hex, hit),
        })
        .collect())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn hit() -> AircraftHit {
        AircraftHit {
            distance: 0.168,
            altitude: 3000.0,
            flight: "DAL123  ".to_string(),
        }
    }

    #[test]
    fn test_render_all_placeholders() {
        let out = render(
            "Aircraft $hex ($flight) is near by!  It is $distance km away at $altitude ft",
            "A1B2C3",
            &hit(),
        )
        .unwrap();
        assert_eq!(
            out,
            "Aircraft A1B2C3 (DAL123  ) is near by!  It is 0.168 km away at 3000 ft"
        );
    }

    #[test]
    fn test_braced_and_escaped() {
        let out = render("${hex}x costs $$5 at ${altitude}ft", "A1B2C3", &hit()).unwrap();
        assert_eq!(out, "A1B2C3x costs $5 at 3000ft");
    }

    #[test]
    fn test_no_placeholders() {
        assert_eq!(render("Aircraft Alert", "A", &hit()).unwrap(), "Aircraft Alert");
        assert_eq!(render("", "A", &hit()).unwrap(), "");
    }

    #[test]
    fn test_unknown_placeholder() {
        let err = render("Squawk $squawk", "A", &hit()).unwrap_err();
        assert_eq!(
            err,
            TemplateError::UnknownPlaceholder {
                name: "squawk".into()
            }
        );
    }

    #[test]
    fn test_name_is_longest_identifier() {
        let err = render("$hexes", "A", &hit()).unwrap_err();
        assert!(matches!(err, TemplateError::UnknownPlaceholder { name } if name == "hexes"));
        assert_eq!(render("$hex-1", "A", &hit()).unwrap(), "A-1");
    }

    #[test]
    fn test_invalid_placeholder() {
        for text in ["cost $5", "trailing $", "${hex", "${}", "${ hex }"] {
            let err = render(text, "A", &hit()).unwrap_err();
            assert!(
                matches!(err, TemplateError::InvalidPlaceholder { .. }),
                "{text}: {err:?}"
            );
        }
    }

    #[test]
    fn test_distance_formatting() {
        let mut h = hit();
        h.distance = 12.5;
        assert_eq!(render("$distance", "A", &h).unwrap(), "12.5");
        h.distance = 0.0;
        assert_eq!(render("$distance", "A", &h).unwrap(), "0");
    }

    #[test]
    fn test_non_ascii_literal() {
        let out = render("✈ $hex · ok", "A1B2C3", &hit()).unwrap();
        assert_eq!(out, "✈ A1B2C3 · ok");
    }

    #[test]
    fn test_notifications_for_record() {
        let mut aircraft = BTreeMap::new();
        aircraft.insert("A1B2C3".to_string(), hit());
        aircraft.insert(
            "D4E5F6".to_string(),
            AircraftHit {
                distance: 2.0,
                altitude: 0.0,
                flight: "        ".to_string(),
            },
        );
        let record = AlertRecord {
            friendly_name: "RDU Airport".into(),
            alt_low: 0,
            alt_high: 1_000_000,
            radius_limit: 30.0,
            coord_center: (35.879204, -78.787162),
            aircraft,
        };

        let out = notifications_for("KRDU", "Alert $hex", "$flight at $altitude", &record).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].group, "KRDU");
        assert_eq!(out[0].title, "Alert A1B2C3");
        assert_eq!(out[0].body, "DAL123   at 3000");
        assert_eq!(out[1].hex, "D4E5F6");
        assert_eq!(out[1].body, format!("{} at 0", " ".repeat(8)));

        assert!(notifications_for("KRDU", "ok", "$nope", &record).is_err());
    }
}
