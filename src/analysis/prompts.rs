//! Locale-specific instructions for the label classifier

/// Locale used when none is configured or the configured one is unknown
pub const DEFAULT_LOCALE: &str = "en-US";

/// A locale the app can answer in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Locale {
    pub tag: &'static str,
    pub name: &'static str,
    /// Instruction sent with every label request
    pub instruction: &'static str,
}

pub const SUPPORTED_LOCALES: [Locale; 8] = [
    Locale {
        tag: "en-US",
        name: "English",
        instruction: "What is the main object in this image? Respond with ONLY a single word - the name of the object. Or multiple words if the object is not a single word. No more than 4 words. Respond in English.",
    },
    Locale {
        tag: "es-ES",
        name: "Spanish",
        instruction: "¿Cuál es el objeto principal en esta imagen? Responde con UNA SOLA palabra - el nombre del objeto. O varias palabras si el objeto no es una sola palabra. No más de 4 palabras. Responde en español.",
    },
    Locale {
        tag: "fr-FR",
        name: "French",
        instruction: "Quel est l'objet principal dans cette image? Répondez avec UN SEUL mot - le nom de l'objet. Ou plusieurs mots si l'objet n'est pas un seul mot. Pas plus de 4 mots. Répondez en français.",
    },
    Locale {
        tag: "de-DE",
        name: "German",
        instruction: "Was ist das Hauptobjekt in diesem Bild? Antworten Sie mit NUR EINEM Wort - dem Namen des Objekts. Oder mehrere Wörter, wenn das Objekt kein einzelnes Wort ist. Nicht mehr als 4 Wörter. Antworten Sie auf Deutsch.",
    },
    Locale {
        tag: "it-IT",
        name: "Italian",
        instruction: "Qual è l'oggetto principale in questa immagine? Rispondi con UNA SOLA parola - il nome dell'oggetto. O più parole se l'oggetto non è una sola parola. Non più di 4 parole. Rispondi in italiano.",
    },
    Locale {
        tag: "pt-BR",
        name: "Portuguese",
        instruction: "Qual é o objeto principal nesta imagem? Responda com UMA ÚNICA palavra - o nome do objeto. Ou várias palavras se o objeto não for uma única palavra. Não mais que 4 palavras. Responda em português.",
    },
    Locale {
        tag: "ja-JP",
        name: "Japanese",
        instruction: "この画像の主な物体は何ですか？単一の単語でのみ回答してください - 物体の名前。物体が単一の単語でない場合は複数の単語。4語以内。日本語で回答してください。",
    },
    Locale {
        tag: "zh-CN",
        name: "Chinese",
        instruction: "这张图片中的主要对象是什么？只用一个词回答 - 对象的名称。如果对象不是一个词，则使用多个词。不超过4个词。用中文回答。",
    },
];

/// Look up a supported locale by tag
pub fn locale(tag: &str) -> Option<&'static Locale> {
    SUPPORTED_LOCALES.iter().find(|locale| locale.tag == tag)
}

/// Label instruction for `tag`, falling back to English
pub fn instruction_for(tag: &str) -> &'static str {
    locale(tag)
        .or_else(|| locale(DEFAULT_LOCALE))
        .map(|locale| locale.instruction)
        .unwrap_or(SUPPORTED_LOCALES[0].instruction)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_locale_falls_back_to_english() {
        assert_eq!(instruction_for("xx-XX"), instruction_for("en-US"));
        assert!(instruction_for("fr-FR").contains("français"));
    }

    #[test]
    fn test_every_instruction_limits_word_count() {
        for locale in SUPPORTED_LOCALES {
            assert!(locale.instruction.contains('4'), "{}", locale.tag);
        }
    }
}
