use regex::Regex;
use std::sync::OnceLock;

/// Command word that forces image generation when it opens the message.
pub const IMAGE_COMMAND: &str = "/img";

/// Phrases that reroute a chat message to image generation wherever they appear.
pub const IMAGE_TRIGGER_PHRASES: &[&str] = &[
    "desenhe",
    "gere uma imagem",
    "imagem de",
    "draw",
    "image of",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Chat,
    Image,
}

static TRIGGERS: OnceLock<Regex> = OnceLock::new();

fn trigger_regex() -> &'static Regex {
    TRIGGERS.get_or_init(|| {
        let phrases: Vec<String> = IMAGE_TRIGGER_PHRASES
            .iter()
            .map(|p| regex::escape(p))
            .collect();
        let pattern = format!(
            r"(?i)^\s*{}|{}",
            regex::escape(IMAGE_COMMAND),
            phrases.join("|")
        );
        Regex::new(&pattern).expect("trigger pattern is built from escaped literals")
    })
}

/// Decide which endpoint a chat message goes to.
pub fn route_for(text: &str) -> Route {
    if trigger_regex().is_match(text) {
        Route::Image
    } else {
        Route::Chat
    }
}

/// Prompt sent to the image endpoint: the message without a leading `/img`.
pub fn image_prompt(text: &str) -> String {
    let trimmed = text.trim();
    let command_len = IMAGE_COMMAND.len();
    let has_command = trimmed
        .get(..command_len)
        .map(|head| head.eq_ignore_ascii_case(IMAGE_COMMAND))
        .unwrap_or(false);

    if has_command {
        let rest = trimmed[command_len..].trim();
        if !rest.is_empty() {
            return rest.to_string();
        }
    }
    trimmed.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_trigger_routes_to_image() {
        for phrase in IMAGE_TRIGGER_PHRASES {
            let text = format!("por favor {} um barco", phrase);
            assert_eq!(route_for(&text), Route::Image, "{}", text);
        }
        assert_eq!(route_for("/img a red fox"), Route::Image);
    }

    #[test]
    fn matching_ignores_case() {
        assert_eq!(route_for("DESENHE um gato"), Route::Image);
        assert_eq!(route_for("Show me an Image Of the moon"), Route::Image);
        assert_eq!(route_for("  /IMG sunset"), Route::Image);
        assert_eq!(route_for("Gere Uma Imagem bonita"), Route::Image);
    }

    #[test]
    fn plain_text_routes_to_chat() {
        assert_eq!(route_for("Olá, tudo bem?"), Route::Chat);
        assert_eq!(route_for("what is an imagination"), Route::Chat);
        assert_eq!(route_for(""), Route::Chat);
    }

    #[test]
    fn img_command_only_counts_at_the_start() {
        assert_eq!(route_for("use the /img command"), Route::Chat);
    }

    #[test]
    fn image_prompt_strips_the_command() {
        assert_eq!(image_prompt("/img a red fox"), "a red fox");
        assert_eq!(image_prompt("  /IMG   sunset "), "sunset");
        assert_eq!(image_prompt("desenhe um gato"), "desenhe um gato");
        assert_eq!(image_prompt("/img"), "/img");
    }
}
