//! Alias normalization
//!
//! Two independent lookup tables bracket the classifier:
//!
//! - the **canonical table** runs before classification and folds legacy,
//!   human-readable event labels (old UI exports like "FUP 2 resposta") into
//!   the underscored naming convention the classifier expects;
//! - the **display table** runs after classification and collapses the many
//!   send/reply name variants of one logical campaign step into a single
//!   friendly label for reporting.
//!
//! Both are total functions: a canonical miss returns the raw name unchanged,
//! a display miss falls back to the classifier's template. Extending the
//! tables is how new campaigns get friendly names without touching the
//! classifier.

use std::collections::HashMap;

/// Case-insensitive alias tables applied around classification.
pub struct AliasNormalizer {
    canonical: HashMap<String, String>,
    display: HashMap<String, String>,
}

impl AliasNormalizer {
    /// Normalizer preloaded with the built-in alias tables.
    pub fn new() -> Self {
        Self::from_entries(default_canonical_entries(), default_display_entries())
    }

    /// Normalizer with explicit tables.
    ///
    /// Duplicate keys are resolved last-write-wins and flagged with a
    /// configuration warning, never a runtime error.
    pub fn from_entries(
        canonical: impl IntoIterator<Item = (String, String)>,
        display: impl IntoIterator<Item = (String, String)>,
    ) -> Self {
        Self {
            canonical: build_table("canonical", canonical),
            display: build_table("display", display),
        }
    }

    /// Merge extra entries into the canonical table, overriding built-ins.
    pub fn extend_canonical(&mut self, entries: impl IntoIterator<Item = (String, String)>) {
        for (key, value) in entries {
            self.canonical.insert(key.to_lowercase(), value);
        }
    }

    /// Merge extra entries into the display table, overriding built-ins.
    pub fn extend_display(&mut self, entries: impl IntoIterator<Item = (String, String)>) {
        for (key, value) in entries {
            self.display.insert(key.to_lowercase(), value);
        }
    }

    /// Rewrite a legacy event name to its canonical form.
    ///
    /// Identity for names with no table entry.
    pub fn canonicalize(&self, raw_name: &str) -> String {
        self.canonical
            .get(&raw_name.to_lowercase())
            .cloned()
            .unwrap_or_else(|| raw_name.to_string())
    }

    /// Friendly label for a classified event.
    ///
    /// Looked up by the canonical event name; the fallback is the
    /// classifier's `template`, never the raw name.
    pub fn display_name(&self, canonical_name: &str, template: &str) -> String {
        self.display
            .get(&canonical_name.to_lowercase())
            .cloned()
            .unwrap_or_else(|| template.to_string())
    }
}

impl Default for AliasNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

fn build_table(
    table: &str,
    entries: impl IntoIterator<Item = (String, String)>,
) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for (key, value) in entries {
        let key = key.to_lowercase();
        if map.insert(key.clone(), value).is_some() {
            tracing::warn!(table, key, "Duplicate alias key, keeping last value");
        }
    }
    map
}

/// Legacy UI labels folded into the robot's underscored naming convention.
fn default_canonical_entries() -> Vec<(String, String)> {
    const ENTRIES: &[(&str, &str)] = &[
        (
            "opt-in ativo saber mais",
            "robo_giovanna_leads_ativos_0_opt_in_ativo_Resposta_Saber mais",
        ),
        (
            "opt-in pessoa errada",
            "robo_giovanna_leads_ativos_0_opt_in_ativo_Resposta_Pessoa errada",
        ),
        (
            "opt-in bloquear mensagens",
            "robo_giovanna_leads_ativos_0_opt_in_ativo_Resposta_Bloqueio",
        ),
        (
            "OPT_IN Resposta",
            "robo_giovanna_leads_ativos_0_opt_in_ativo_Resposta_Texto",
        ),
        (
            "opt-in ativo fup1",
            "robo_giovanna_leads_ativos_0fup1_ativo_Envio",
        ),
        (
            "FUP 1 resposta",
            "robo_giovanna_leads_ativos_0fup1_ativo_Resposta",
        ),
        (
            "opt-in ativo fup2",
            "robo_giovanna_leads_ativos_0fup2_ativo_Envio",
        ),
        (
            "FUP 2 resposta",
            "robo_giovanna_leads_ativos_0fup2_ativo_Resposta",
        ),
        (
            "opt-in ativo fup3",
            "robo_giovanna_leads_ativos_0fup3_ativo_Envio",
        ),
        (
            "FUP 3 resposta",
            "robo_giovanna_leads_ativos_0fup3_ativo_Resposta",
        ),
        (
            "opt-in ativo fup 30min",
            "robo_giovanna_leads_ativos_0opt_in_ativo_30min_v0_Envio",
        ),
        (
            "FUP 30min resposta",
            "robo_giovanna_leads_ativos_0opt_in_ativo_30min_v0_Resposta",
        ),
        (
            "opt-in ativo despedida",
            "robo_giovanna_leads_ativos_0despedida_ativo_Envio",
        ),
        (
            "Despedida resposta",
            "robo_giovanna_leads_ativos_0despedida_ativo_Resposta",
        ),
    ];
    ENTRIES
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Send/reply variants of one campaign step collapsed into one label.
fn default_display_entries() -> Vec<(String, String)> {
    const ENTRIES: &[(&str, &str)] = &[
        ("robo_giovanna_leads_ativos_0fup1_ativo_Envio", "FUP 1"),
        ("robo_giovanna_leads_ativos_0fup1_ativo_Resposta", "FUP 1"),
        ("robo_giovanna_leads_ativos_0fup2_ativo_Envio", "FUP 2"),
        ("robo_giovanna_leads_ativos_0fup2_ativo_Resposta", "FUP 2"),
        ("robo_giovanna_leads_ativos_0fup3_ativo_Envio", "FUP 3"),
        ("robo_giovanna_leads_ativos_0fup3_ativo_Resposta", "FUP 3"),
        (
            "robo_giovanna_leads_ativos_0opt_in_ativo_30min_v0_Envio",
            "FUP 30min",
        ),
        (
            "robo_giovanna_leads_ativos_0opt_in_ativo_30min_v0_Resposta",
            "FUP 30min",
        ),
        (
            "robo_giovanna_leads_ativos_0despedida_ativo_Envio",
            "Despedida",
        ),
        (
            "robo_giovanna_leads_ativos_0despedida_ativo_Resposta",
            "Despedida",
        ),
        (
            "robo_giovanna_leads_ativos_0_opt_in_ativo_Resposta_Saber mais",
            "Opt-in",
        ),
        (
            "robo_giovanna_leads_ativos_0_opt_in_ativo_Resposta_Pessoa errada",
            "Opt-in",
        ),
        (
            "robo_giovanna_leads_ativos_0_opt_in_ativo_Resposta_Bloqueio",
            "Opt-in",
        ),
        (
            "robo_giovanna_leads_ativos_0_opt_in_ativo_Resposta_Texto",
            "Opt-in",
        ),
    ];
    ENTRIES
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
