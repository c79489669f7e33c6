use regex::Regex;
use std::sync::OnceLock;

pub const MAX_BULLETS: usize = 8;

fn bullet_boundary() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\n-\s*").expect("static regex"))
}

/// Rewrites free model text into at most `MAX_BULLETS` lines of `- item`.
///
/// Best effort only: a sentence that legitimately contains ". -" is split
/// there as well.
pub fn bulletize(raw: &str) -> String {
    let text = raw
        .replace('\u{2022}', "-")
        .replace('*', "-")
        .replace(". -", ".\n-");

    bullet_boundary()
        .split(&text)
        .filter_map(clean_fragment)
        .take(MAX_BULLETS)
        .map(|p| format!("- {}", p))
        .collect::<Vec<_>>()
        .join("\n")
}

fn clean_fragment(p: &str) -> Option<String> {
    let p = p.trim().trim_start_matches('-').trim();
    let p = p.trim_end_matches('.').trim_end();
    if p.is_empty() {
        None
    } else {
        Some(p.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_sentences_become_one_bullet() {
        assert_eq!(bulletize("Point one. Point two."), "- Point one. Point two");
    }

    #[test]
    fn glyphs_are_normalized_and_split() {
        let raw = "Happy to help!\n\u{2022} Plan ahead.\n* Use quizzes.\n- Praise effort.";
        assert_eq!(
            bulletize(raw),
            "- Happy to help!\n- Plan ahead\n- Use quizzes\n- Praise effort"
        );
    }

    #[test]
    fn inline_dash_after_period_starts_a_new_bullet() {
        assert_eq!(bulletize("Try this. - Then that."), "- Try this\n- Then that");
    }

    #[test]
    fn leading_bullet_is_not_doubled() {
        assert_eq!(bulletize("- first\n- second"), "- first\n- second");
    }

    #[test]
    fn output_is_capped() {
        let raw: String = (1..=12).map(|i| format!("\n- item {}.", i)).collect();
        let out = bulletize(&raw);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), MAX_BULLETS);
        assert_eq!(lines[0], "- item 1");
        assert_eq!(lines[7], "- item 8");
    }

    #[test]
    fn empty_text_yields_nothing() {
        assert_eq!(bulletize("  \n- \n"), "");
    }
}
