use super::StoreError;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    /// `*`: exactly one segment
    One,
    /// `**`: one or more trailing segments
    Rest,
}

/// Wildcard key pattern over `/`-separated keys.
///
/// `points/**` matches `points/a` and `points/a/b` but not `points`;
/// `points/*` matches only `points/a`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPattern {
    segments: Vec<Segment>,
}

impl KeyPattern {
    pub fn parse(pattern: &str) -> Result<Self, StoreError> {
        if pattern.is_empty() {
            return Err(StoreError::InvalidPattern("empty pattern".into()));
        }
        let parts: Vec<&str> = pattern.split('/').collect();
        let last = parts.len() - 1;
        let mut segments = Vec::with_capacity(parts.len());
        for (i, part) in parts.into_iter().enumerate() {
            let seg = match part {
                "**" if i == last => Segment::Rest,
                "**" => {
                    return Err(StoreError::InvalidPattern(format!(
                        "'**' is only allowed as the last segment: {pattern}"
                    )))
                }
                "*" => Segment::One,
                p if p.contains('*') => {
                    return Err(StoreError::InvalidPattern(format!("partial wildcard in {pattern}")))
                }
                "" => return Err(StoreError::InvalidPattern(format!("empty segment in {pattern}"))),
                p => Segment::Literal(p.to_string()),
            };
            segments.push(seg);
        }
        Ok(Self { segments })
    }

    pub fn matches(&self, key: &str) -> bool {
        let parts: Vec<&str> = key.split('/').collect();
        for (i, seg) in self.segments.iter().enumerate() {
            match seg {
                Segment::Rest => return parts.len() > i && parts[i..].iter().all(|p| !p.is_empty()),
                Segment::One => match parts.get(i) {
                    Some(p) if !p.is_empty() => {}
                    _ => return false,
                },
                Segment::Literal(lit) => {
                    if parts.get(i) != Some(&lit.as_str()) {
                        return false;
                    }
                }
            }
        }
        parts.len() == self.segments.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn double_star_matches_any_depth_below_prefix() {
        let p = KeyPattern::parse("ai.intrinsic/points/**").unwrap();
        assert!(p.matches("ai.intrinsic/points/A"));
        assert!(p.matches("ai.intrinsic/points/A/B"));
        assert!(!p.matches("ai.intrinsic/points"));
        assert!(!p.matches("ai.intrinsic/points/"));
        assert!(!p.matches("ai.intrinsic/pointsX/A"));
        assert!(!p.matches("demo_counters/A"));
    }

    #[test]
    fn single_star_matches_one_segment() {
        let p = KeyPattern::parse("demo_counters/*").unwrap();
        assert!(p.matches("demo_counters/c"));
        assert!(!p.matches("demo_counters/c/d"));
        assert!(!p.matches("demo_counters"));
    }

    #[test]
    fn literal_pattern_is_exact() {
        let p = KeyPattern::parse("demo_counters/c").unwrap();
        assert!(p.matches("demo_counters/c"));
        assert!(!p.matches("demo_counters/cc"));
    }

    #[test]
    fn rejects_malformed_patterns() {
        assert!(KeyPattern::parse("").is_err());
        assert!(KeyPattern::parse("a/**/b").is_err());
        assert!(KeyPattern::parse("a/b*").is_err());
        assert!(KeyPattern::parse("a//b").is_err());
    }
}
