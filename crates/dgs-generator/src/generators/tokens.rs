//! Named replacement tokens for `value` templates.
//!
//! A template is plain text with `${name}` placeholders. A template that is
//! exactly one known token yields that token's native value; otherwise every
//! known placeholder is replaced by the text form of a fresh value and
//! everything else, unknown placeholders included, is kept verbatim.

use super::uuid::generate_uuid_v4;
use chrono::Utc;
use dgs_core::Value;
use fake::faker::address::en::{CityName, CountryCode, CountryName, StreetName, ZipCode};
use fake::faker::company::en::{CompanyName, Profession};
use fake::faker::currency::en::CurrencyCode;
use fake::faker::internet::en::{MACAddress, SafeEmail, UserAgent, Username, IP, IPv4, IPv6};
use fake::faker::lorem::en::{Paragraph, Sentence, Word};
use fake::faker::name::en::{FirstName, LastName, Name};
use fake::faker::phone_number::en::PhoneNumber;
use fake::Fake;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::Rng;

/// A named value generator usable inside templates.
pub struct Token {
    pub name: &'static str,
    pub description: &'static str,
    generate: fn(&mut StdRng) -> Value,
}

impl Token {
    /// Produce a fresh value.
    pub fn generate(&self, rng: &mut StdRng) -> Value {
        (self.generate)(rng)
    }
}

impl std::fmt::Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Token").field("name", &self.name).finish()
    }
}

const HTTP_METHODS: &[&str] = &[
    "GET", "HEAD", "POST", "PUT", "PATCH", "DELETE", "OPTIONS", "TRACE", "CONNECT",
];

const HTTP_STATUS_CODES: &[i64] = &[
    100, 101, 200, 201, 202, 204, 206, 301, 302, 303, 304, 307, 308, 400, 401, 403, 404, 405, 409,
    410, 412, 415, 418, 422, 429, 500, 501, 502, 503, 504,
];

fn text(s: String) -> Value {
    Value::String(s)
}

static TOKENS: &[Token] = &[
    Token {
        name: "uuid",
        description: "Random v4 UUID",
        generate: |rng| Value::Uuid(generate_uuid_v4(rng)),
    },
    Token {
        name: "bool",
        description: "Random boolean",
        generate: |rng| Value::Bool(rng.random_bool(0.5)),
    },
    Token {
        name: "int8",
        description: "Random 8-bit signed integer",
        generate: |rng| Value::Int(rng.random::<i8>() as i64),
    },
    Token {
        name: "int16",
        description: "Random 16-bit signed integer",
        generate: |rng| Value::Int(rng.random::<i16>() as i64),
    },
    Token {
        name: "int32",
        description: "Random 32-bit signed integer",
        generate: |rng| Value::Int(rng.random::<i32>() as i64),
    },
    Token {
        name: "int64",
        description: "Random 64-bit signed integer",
        generate: |rng| Value::Int(rng.random::<i64>()),
    },
    Token {
        name: "uint8",
        description: "Random 8-bit unsigned integer",
        generate: |rng| Value::Int(rng.random::<u8>() as i64),
    },
    Token {
        name: "uint16",
        description: "Random 16-bit unsigned integer",
        generate: |rng| Value::Int(rng.random::<u16>() as i64),
    },
    Token {
        name: "uint32",
        description: "Random 32-bit unsigned integer",
        generate: |rng| Value::Int(rng.random::<u32>() as i64),
    },
    Token {
        name: "float32",
        description: "Random 32-bit float in [0, 1)",
        generate: |rng| Value::Float(rng.random::<f32>() as f64),
    },
    Token {
        name: "float64",
        description: "Random 64-bit float in [0, 1)",
        generate: |rng| Value::Float(rng.random::<f64>()),
    },
    Token {
        name: "email",
        description: "Email address on a reserved domain",
        generate: |rng| text(SafeEmail().fake_with_rng(rng)),
    },
    Token {
        name: "first_name",
        description: "Given name",
        generate: |rng| text(FirstName().fake_with_rng(rng)),
    },
    Token {
        name: "last_name",
        description: "Family name",
        generate: |rng| text(LastName().fake_with_rng(rng)),
    },
    Token {
        name: "name",
        description: "Full name",
        generate: |rng| text(Name().fake_with_rng(rng)),
    },
    Token {
        name: "username",
        description: "Login name",
        generate: |rng| text(Username().fake_with_rng(rng)),
    },
    Token {
        name: "word",
        description: "Lorem ipsum word",
        generate: |rng| text(Word().fake_with_rng(rng)),
    },
    Token {
        name: "sentence",
        description: "Lorem ipsum sentence",
        generate: |rng| text(Sentence(5..10).fake_with_rng(rng)),
    },
    Token {
        name: "paragraph",
        description: "Lorem ipsum paragraph",
        generate: |rng| text(Paragraph(3..5).fake_with_rng(rng)),
    },
    Token {
        name: "company",
        description: "Company name",
        generate: |rng| text(CompanyName().fake_with_rng(rng)),
    },
    Token {
        name: "job_title",
        description: "Profession",
        generate: |rng| text(Profession().fake_with_rng(rng)),
    },
    Token {
        name: "city",
        description: "City name",
        generate: |rng| text(CityName().fake_with_rng(rng)),
    },
    Token {
        name: "country",
        description: "Country name",
        generate: |rng| text(CountryName().fake_with_rng(rng)),
    },
    Token {
        name: "country_code",
        description: "Two letter country code",
        generate: |rng| text(CountryCode().fake_with_rng(rng)),
    },
    Token {
        name: "street",
        description: "Street name",
        generate: |rng| text(StreetName().fake_with_rng(rng)),
    },
    Token {
        name: "zip",
        description: "Postal code",
        generate: |rng| text(ZipCode().fake_with_rng(rng)),
    },
    Token {
        name: "phone",
        description: "Phone number",
        generate: |rng| text(PhoneNumber().fake_with_rng(rng)),
    },
    Token {
        name: "ip",
        description: "IPv4 or IPv6 address",
        generate: |rng| text(IP().fake_with_rng(rng)),
    },
    Token {
        name: "ipv4",
        description: "IPv4 address",
        generate: |rng| text(IPv4().fake_with_rng(rng)),
    },
    Token {
        name: "ipv6",
        description: "IPv6 address",
        generate: |rng| text(IPv6().fake_with_rng(rng)),
    },
    Token {
        name: "mac",
        description: "MAC address",
        generate: |rng| text(MACAddress().fake_with_rng(rng)),
    },
    Token {
        name: "user_agent",
        description: "Browser user agent",
        generate: |rng| text(UserAgent().fake_with_rng(rng)),
    },
    Token {
        name: "status_code",
        description: "HTTP status code",
        generate: |rng| Value::Int(HTTP_STATUS_CODES.choose(rng).copied().unwrap_or(200)),
    },
    Token {
        name: "http_method",
        description: "HTTP request method",
        generate: |rng| text(HTTP_METHODS.choose(rng).copied().unwrap_or("GET").to_string()),
    },
    Token {
        name: "hex_color",
        description: "Hex colour such as #1a2b3c",
        generate: |rng| text(format!("#{:06x}", rng.random_range(0..0x0100_0000u32))),
    },
    Token {
        name: "currency_code",
        description: "ISO 4217 currency code",
        generate: |rng| text(CurrencyCode().fake_with_rng(rng)),
    },
    Token {
        name: "date",
        description: "Current UTC time",
        generate: |_| Value::Timestamp(Utc::now()),
    },
];

/// All registered tokens in display order.
pub fn tokens() -> &'static [Token] {
    TOKENS
}

/// Find a token by name.
pub fn lookup(name: &str) -> Option<&'static Token> {
    TOKENS.iter().find(|t| t.name == name)
}

/// Name inside a template that is exactly one `${name}` placeholder.
fn single_placeholder(template: &str) -> Option<&str> {
    let name = template.strip_prefix("${")?.strip_suffix('}')?;
    if name.contains('}') || name.contains("${") {
        return None;
    }
    Some(name)
}

/// Expand a template into a value.
pub fn expand_template(template: &str, rng: &mut StdRng) -> Value {
    if let Some(token) = single_placeholder(template).and_then(lookup) {
        return token.generate(rng);
    }

    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            out.push_str(&rest[start..]);
            return Value::String(out);
        };

        let name = &after[..end];
        match lookup(name) {
            Some(token) => out.push_str(&token.generate(rng).to_string()),
            None => out.push_str(&rest[start..start + end + 3]),
        }
        rest = &after[end + 1..];
    }

    out.push_str(rest);
    Value::String(out)
}
