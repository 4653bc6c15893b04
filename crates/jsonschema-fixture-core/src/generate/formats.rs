//! Named string formats.

use chrono::{DateTime, SecondsFormat, Utc};
use rand::Rng;

const WORD_CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789_";
const HEX: &[u8] = b"0123456789abcdef";

/// Upper bound for generated timestamps, in milliseconds since the epoch.
const MAX_TIMESTAMP_MILLIS: i64 = 100_000_000_000_000;

/// A `format` keyword the generator knows how to satisfy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    DateTime,
    Date,
    Time,
    Email,
    Hostname,
    Ipv4,
    Ipv6,
    Uri,
    Phone,
    Uuid,
    /// Unknown format; generated as an unconstrained string.
    Other,
}

impl Format {
    pub fn parse(name: &str) -> Self {
        match name {
            "date-time" => Format::DateTime,
            "date" => Format::Date,
            "time" => Format::Time,
            "email" => Format::Email,
            "hostname" => Format::Hostname,
            "ipv4" => Format::Ipv4,
            "ipv6" => Format::Ipv6,
            "uri" => Format::Uri,
            "phone" => Format::Phone,
            "uuid" => Format::Uuid,
            _ => Format::Other,
        }
    }

    /// Generate a string in this format. `max_repeat` bounds the free-form
    /// word parts (local part of an email, host labels, URI path).
    ///
    /// Returns `None` for [`Format::Other`].
    pub fn synthesize<R: Rng>(self, rng: &mut R, max_repeat: u32) -> Option<String> {
        let value = match self {
            Format::DateTime => {
                random_timestamp(rng).to_rfc3339_opts(SecondsFormat::Millis, true)
            }
            Format::Date => random_timestamp(rng).format("%Y-%m-%d").to_string(),
            Format::Time => random_timestamp(rng).format("%H:%M:%S%.3fZ").to_string(),
            Format::Email => format!("{}@example.com", word(rng, max_repeat)),
            Format::Hostname => format!("{}.example.com", word(rng, max_repeat)),
            Format::Ipv4 => {
                let octets: Vec<String> = (0..4).map(|_| rng.gen_range(0..=255u8).to_string()).collect();
                octets.join(".")
            }
            Format::Ipv6 => {
                let groups: Vec<String> = (0..8).map(|_| hex(rng, 4)).collect();
                groups.join(":")
            }
            Format::Uri => format!(
                "https://{}.example.com/{}",
                word(rng, max_repeat),
                word(rng, max_repeat)
            ),
            Format::Phone => format!(
                "{:03}-{:03}-{:04}",
                rng.gen_range(0..1000),
                rng.gen_range(0..1000),
                rng.gen_range(0..10000)
            ),
            Format::Uuid => format!(
                "{}-{}-4{}-{}{}-{}",
                hex(rng, 8),
                hex(rng, 4),
                hex(rng, 3),
                ['8', '9', 'a', 'b'][rng.gen_range(0..4)],
                hex(rng, 3),
                hex(rng, 12)
            ),
            Format::Other => return None,
        };
        Some(value)
    }
}

fn random_timestamp<R: Rng>(rng: &mut R) -> DateTime<Utc> {
    let millis = rng.gen_range(0..=MAX_TIMESTAMP_MILLIS);
    DateTime::from_timestamp_millis(millis).unwrap_or_default()
}

/// `\w+`, at most `max_repeat` characters.
fn word<R: Rng>(rng: &mut R, max_repeat: u32) -> String {
    let len = rng.gen_range(1..=max_repeat.max(1));
    (0..len)
        .map(|_| WORD_CHARS[rng.gen_range(0..WORD_CHARS.len())] as char)
        .collect()
}

fn hex<R: Rng>(rng: &mut R, len: usize) -> String {
    (0..len)
        .map(|_| HEX[rng.gen_range(0..HEX.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn sample(format: &str) -> String {
        let mut rng = StdRng::seed_from_u64(11);
        Format::parse(format).synthesize(&mut rng, 10).unwrap()
    }

    fn assert_matches(format: &str, pattern: &str) {
        let re = regex::Regex::new(pattern).unwrap();
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..25 {
            let s = Format::parse(format).synthesize(&mut rng, 10).unwrap();
            assert!(re.is_match(&s), "{format}: {s:?} does not match {pattern}");
        }
    }

    #[test]
    fn test_email() {
        assert_matches("email", r"^\w{1,10}@example\.com$");
    }

    #[test]
    fn test_hostname_and_uri() {
        assert_matches("hostname", r"^\w+\.example\.com$");
        assert_matches("uri", r"^https://\w+\.example\.com/\w+$");
    }

    #[test]
    fn test_ipv4_octets_in_range() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..25 {
            let ip = Format::Ipv4.synthesize(&mut rng, 10).unwrap();
            assert!(ip.parse::<std::net::Ipv4Addr>().is_ok(), "{ip}");
        }
    }

    #[test]
    fn test_ipv6_parses() {
        let ip = sample("ipv6");
        assert!(ip.parse::<std::net::Ipv6Addr>().is_ok(), "{ip}");
    }

    #[test]
    fn test_phone_and_uuid() {
        assert_matches("phone", r"^\d{3}-\d{3}-\d{4}$");
        assert_matches(
            "uuid",
            r"^[0-9a-f]{8}-[0-9a-f]{4}-4[0-9a-f]{3}-[89ab][0-9a-f]{3}-[0-9a-f]{12}$",
        );
    }

    #[test]
    fn test_date_time_is_rfc3339() {
        let s = sample("date-time");
        assert!(DateTime::parse_from_rfc3339(&s).is_ok(), "{s}");
        assert_matches("date", r"^\d{4,}-\d{2}-\d{2}$");
        assert_matches("time", r"^\d{2}:\d{2}:\d{2}\.\d{3}Z$");
    }

    #[test]
    fn test_unknown_format() {
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(Format::parse("color"), Format::Other);
        assert!(Format::Other.synthesize(&mut rng, 10).is_none());
    }
}
