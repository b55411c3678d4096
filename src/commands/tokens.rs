//! `gen tokens`: list the value template tokens.

use dgs_generator::generators::{tokens, Token};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Render the token registry as a markdown table with one sample per token.
pub fn render_tokens(tokens: &[Token], rng: &mut StdRng) -> String {
    let mut out = String::from("| Token | Description | Example |\n|---|---|---|\n");
    for token in tokens {
        let sample = token.generate(rng).to_string().replace('|', "\\|");
        out.push_str(&format!(
            "| `${{{}}}` | {} | {} |\n",
            token.name, token.description, sample
        ));
    }
    out
}

pub fn run_tokens() {
    let mut rng = StdRng::from_os_rng();
    print!("{}", render_tokens(tokens(), &mut rng));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_tokens() {
        let mut rng = StdRng::seed_from_u64(42);
        let table = render_tokens(tokens(), &mut rng);
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines[0], "| Token | Description | Example |");
        assert_eq!(lines.len(), tokens().len() + 2);
        assert!(lines.iter().any(|l| l.starts_with("| `${uuid}` |")));
        assert!(lines.iter().any(|l| l.starts_with("| `${email}` |")));
    }
}
