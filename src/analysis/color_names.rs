//! Color-name localization

/// Translates a raw color name into a locale
pub trait ColorLocalizer: Send + Sync {
    /// Returns the untranslated input when no mapping exists
    fn localize(&self, color_name: &str, locale: &str) -> String;
}

type Translations = &'static [(&'static str, &'static str)];

const COLORS: &[(&str, Translations)] = &[
    (
        "red",
        &[
            ("en-US", "red"),
            ("es-ES", "rojo"),
            ("fr-FR", "rouge"),
            ("de-DE", "rot"),
            ("it-IT", "rosso"),
            ("pt-BR", "vermelho"),
            ("ja-JP", "赤"),
            ("zh-CN", "红色"),
        ],
    ),
    (
        "blue",
        &[
            ("en-US", "blue"),
            ("es-ES", "azul"),
            ("fr-FR", "bleu"),
            ("de-DE", "blau"),
            ("it-IT", "blu"),
            ("pt-BR", "azul"),
            ("ja-JP", "青"),
            ("zh-CN", "蓝色"),
        ],
    ),
    (
        "green",
        &[
            ("en-US", "green"),
            ("es-ES", "verde"),
            ("fr-FR", "vert"),
            ("de-DE", "grün"),
            ("it-IT", "verde"),
            ("pt-BR", "verde"),
            ("ja-JP", "緑"),
            ("zh-CN", "绿色"),
        ],
    ),
    (
        "yellow",
        &[
            ("en-US", "yellow"),
            ("es-ES", "amarillo"),
            ("fr-FR", "jaune"),
            ("de-DE", "gelb"),
            ("it-IT", "giallo"),
            ("pt-BR", "amarelo"),
            ("ja-JP", "黄色"),
            ("zh-CN", "黄色"),
        ],
    ),
    (
        "orange",
        &[
            ("en-US", "orange"),
            ("es-ES", "naranja"),
            ("fr-FR", "orange"),
            ("de-DE", "orange"),
            ("it-IT", "arancione"),
            ("pt-BR", "laranja"),
            ("ja-JP", "オレンジ"),
            ("zh-CN", "橙色"),
        ],
    ),
    (
        "purple",
        &[
            ("en-US", "purple"),
            ("es-ES", "morado"),
            ("fr-FR", "violet"),
            ("de-DE", "lila"),
            ("it-IT", "viola"),
            ("pt-BR", "roxo"),
            ("ja-JP", "紫"),
            ("zh-CN", "紫色"),
        ],
    ),
    (
        "pink",
        &[
            ("en-US", "pink"),
            ("es-ES", "rosa"),
            ("fr-FR", "rose"),
            ("de-DE", "rosa"),
            ("it-IT", "rosa"),
            ("pt-BR", "rosa"),
            ("ja-JP", "ピンク"),
            ("zh-CN", "粉色"),
        ],
    ),
    (
        "brown",
        &[
            ("en-US", "brown"),
            ("es-ES", "marrón"),
            ("fr-FR", "marron"),
            ("de-DE", "braun"),
            ("it-IT", "marrone"),
            ("pt-BR", "marrom"),
            ("ja-JP", "茶色"),
            ("zh-CN", "棕色"),
        ],
    ),
    (
        "black",
        &[
            ("en-US", "black"),
            ("es-ES", "negro"),
            ("fr-FR", "noir"),
            ("de-DE", "schwarz"),
            ("it-IT", "nero"),
            ("pt-BR", "preto"),
            ("ja-JP", "黒"),
            ("zh-CN", "黑色"),
        ],
    ),
    (
        "white",
        &[
            ("en-US", "white"),
            ("es-ES", "blanco"),
            ("fr-FR", "blanc"),
            ("de-DE", "weiß"),
            ("it-IT", "bianco"),
            ("pt-BR", "branco"),
            ("ja-JP", "白"),
            ("zh-CN", "白色"),
        ],
    ),
    (
        "gray",
        &[
            ("en-US", "gray"),
            ("es-ES", "gris"),
            ("fr-FR", "gris"),
            ("de-DE", "grau"),
            ("it-IT", "grigio"),
            ("pt-BR", "cinza"),
            ("ja-JP", "灰色"),
            ("zh-CN", "灰色"),
        ],
    ),
    (
        "grey",
        &[
            ("en-US", "grey"),
            ("es-ES", "gris"),
            ("fr-FR", "gris"),
            ("de-DE", "grau"),
            ("it-IT", "grigio"),
            ("pt-BR", "cinza"),
            ("ja-JP", "灰色"),
            ("zh-CN", "灰色"),
        ],
    ),
];

const MODIFIERS: &[(&str, Translations)] = &[
    (
        "dark",
        &[
            ("en-US", "dark"),
            ("es-ES", "oscuro"),
            ("fr-FR", "foncé"),
            ("de-DE", "dunkel"),
            ("it-IT", "scuro"),
            ("pt-BR", "escuro"),
            ("ja-JP", "濃い"),
            ("zh-CN", "深"),
        ],
    ),
    (
        "light",
        &[
            ("en-US", "light"),
            ("es-ES", "claro"),
            ("fr-FR", "clair"),
            ("de-DE", "hell"),
            ("it-IT", "chiaro"),
            ("pt-BR", "claro"),
            ("ja-JP", "薄い"),
            ("zh-CN", "浅"),
        ],
    ),
];

/// Built-in table covering the basic colors and the dark/light modifiers
#[derive(Debug, Clone, Copy, Default)]
pub struct ColorNameTable;

impl ColorLocalizer for ColorNameTable {
    fn localize(&self, color_name: &str, locale: &str) -> String {
        let normalized = color_name.trim().to_lowercase();

        if let Some((modifier, base)) = split_modifier(&normalized) {
            let modifier = lookup(MODIFIERS, modifier, locale).unwrap_or(modifier);
            let base = lookup(COLORS, base, locale).unwrap_or(base);
            return format!("{modifier} {base}");
        }

        lookup(COLORS, &normalized, locale)
            .map(str::to_string)
            .unwrap_or_else(|| color_name.to_string())
    }
}

/// Split "dark red" or "darkred" into ("dark", "red")
fn split_modifier(name: &str) -> Option<(&'static str, &str)> {
    MODIFIERS.iter().find_map(|(modifier, _)| {
        let base = name.strip_prefix(*modifier)?.trim_start();
        (!base.is_empty()).then_some((*modifier, base))
    })
}

fn lookup(table: &[(&str, Translations)], key: &str, locale: &str) -> Option<&'static str> {
    table
        .iter()
        .find(|(name, _)| *name == key)
        .and_then(|(_, translations)| {
            translations
                .iter()
                .find(|(tag, _)| *tag == locale)
                .map(|(_, text)| *text)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translates_basic_color() {
        assert_eq!(ColorNameTable.localize("Red", "es-ES"), "rojo");
        assert_eq!(ColorNameTable.localize(" white ", "de-DE"), "weiß");
    }

    #[test]
    fn test_translates_modifier_and_base_independently() {
        assert_eq!(ColorNameTable.localize("dark blue", "fr-FR"), "foncé bleu");
        assert_eq!(ColorNameTable.localize("lightgreen", "it-IT"), "chiaro verde");
        // Unknown base keeps its English form next to the translated modifier
        assert_eq!(ColorNameTable.localize("dark teal", "de-DE"), "dunkel teal");
    }

    #[test]
    fn test_unmapped_input_is_returned_untouched() {
        assert_eq!(ColorNameTable.localize("Chartreuse", "ja-JP"), "Chartreuse");
        assert_eq!(ColorNameTable.localize("red", "xx-XX"), "red");
    }
}
