//! ASCII art and banner for the terminal front end

const LOGO: &str = r#"
 _  _____       _            _     _             _
| |/ /_ _|     / \   ___ ___(_)___| |_ ___ _ __ | |_
| ' / | |_____/ _ \ / __/ __| / __| __/ _ \ '_ \| __|
| . \ | |_____/ ___ \\__ \__ \ \__ \ ||  __/ | | | |_
|_|\_\___|   /_/   \_\___/___/_|___/\__\___|_| |_|\__|
"#;

const TITLE: &str = "✨  KI-Assistent Deluxe - CLI Version  ✨";
const WIDTH: usize = 80;

/// Logo plus a framed, centred title line
pub fn banner() -> String {
    let rule = "=".repeat(WIDTH);
    format!("{}\n{}\n{}\n{}\n", LOGO, rule, center(TITLE, WIDTH), rule)
}

pub fn welcome_lines() -> [&'static str; 4] {
    [
        "Willkommen beim KI-Assistent Deluxe!",
        "Ich bin dein persönlicher Assistent und stehe dir mit Rat und Tat zur Seite.",
        "Tippe 'hilfe' um zu sehen, was ich alles kann.",
        "Zum Beenden tippe 'exit', 'quit' oder 'beenden'.",
    ]
}

fn center(text: &str, width: usize) -> String {
    let len = text.chars().count();
    if len >= width {
        return text.to_string();
    }
    let left = (width - len) / 2;
    let right = width - len - left;
    format!("{}{}{}", " ".repeat(left), text, " ".repeat(right))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_banner_contains_title() {
        let banner = banner();
        assert!(banner.contains(TITLE));
        assert!(banner.contains(&"=".repeat(WIDTH)));
    }

    #[test]
    fn test_center() {
        assert_eq!(center("ab", 6), "  ab  ");
        assert_eq!(center("abc", 6), " abc  ");
        assert_eq!(center("zu lang", 3), "zu lang");
        assert_eq!(center(TITLE, WIDTH).chars().count(), WIDTH);
    }
}
