//! Keyword reply tables
//!
//! A reply table is an ordered list of `(keywords, reply)` rules evaluated
//! first-match-wins against the lowercased input, with a templated default
//! that may echo the input through the `{input}` placeholder. The built-in
//! tables below are the defaults for the `[assistant]` configuration section.

use serde::{Deserialize, Serialize};

/// Placeholder replaced by the user's original text in a default template
pub const INPUT_PLACEHOLDER: &str = "{input}";

/// A single keyword rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyRule {
    /// Substrings matched case-insensitively; any one selects the rule
    pub keywords: Vec<String>,
    /// Reply sent when the rule matches
    pub reply: String,
}

impl ReplyRule {
    pub fn new(keywords: &[&str], reply: &str) -> Self {
        Self {
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
            reply: reply.to_string(),
        }
    }

    fn matches(&self, lowered: &str) -> bool {
        self.keywords
            .iter()
            .any(|k| lowered.contains(k.to_lowercase().as_str()))
    }
}

/// Ordered rule table with a default template
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyTable {
    pub default_template: String,
    pub rules: Vec<ReplyRule>,
}

impl ReplyTable {
    /// Return the reply of the first matching rule, or the rendered default.
    pub fn lookup(&self, input: &str) -> String {
        self.matching_rule(input)
            .map(|rule| rule.reply.clone())
            .unwrap_or_else(|| self.default_template.replace(INPUT_PLACEHOLDER, input))
    }

    /// First rule whose keywords occur in `input` (case-insensitive)
    pub fn matching_rule(&self, input: &str) -> Option<&ReplyRule> {
        let lowered = input.to_lowercase();
        self.rules.iter().find(|rule| rule.matches(&lowered))
    }
}

/// Mock-mode replies
pub fn default_mock_replies() -> ReplyTable {
    ReplyTable {
        rules: vec![
            ReplyRule::new(&["tokyo"], "🗾 Tokyo è una metropoli incredibile che fonde tradizione e modernità. I nostri pacchetti includono visite ai templi storici e ai quartieri futuristici di Shibuya."),
            ReplyRule::new(&["santorini"], "🏛️ Santorini offre tramonti mozzafiato e architettura unica. Le nostre escursioni includono degustazioni di vino locale e tour delle tipiche case bianche. Pacchetti da €1800."),
            ReplyRule::new(&["maldive"], "🏝️ Le Maldive sono il paradiso tropicale perfetto per una fuga romantica. I nostri resort offrono bungalow sull'acqua e attività subacquee esclusive."),
            ReplyRule::new(&["machu"], "🏔️ Machu Picchu è un'esperienza spirituale unica nelle Ande. I nostri tour includono trekking guidati e visite ai siti archeologici più importanti."),
            ReplyRule::new(&["islanda"], "❄️ L'Islanda offre paesaggi vulcanici e aurore boreali spettacolari. Le nostre escursioni includono bagni termali e tour dei geyser più famosi."),
            ReplyRule::new(&["prezzo"], "💰 I nostri prezzi vanno da €1800 (Santorini) a €3500 (Maldive). Tutti i pacchetti includono volo, hotel 4 stelle e escursioni guidate."),
            ReplyRule::new(&["viaggio"], "✈️ Offriamo 5 destinazioni esclusive con pacchetti completi. Ogni viaggio include servizi premium e guide esperte locali per un'esperienza indimenticabile."),
        ],
        default_template: "🌍 Grazie per la tua domanda su '{input}'. I nostri consulenti sono specializzati in viaggi premium verso destinazioni esclusive. Come posso aiutarti a pianificare la tua prossima avventura?".to_string(),
    }
}

/// Canned replies used when the provider fails
pub fn default_fallback_replies() -> ReplyTable {
    ReplyTable {
        rules: vec![
            ReplyRule::new(&["tokyo"], "🗾 Tokyo è una destinazione fantastica! Vuoi vedere i dettagli del viaggio?"),
            ReplyRule::new(&["santorini"], "🏛️ Santorini offre tramonti indimenticabili! Ti interessa prenotare?"),
            ReplyRule::new(&["maldive"], "🏝️ Le Maldive sono il paradiso tropicale! Posso mostrarti i nostri pacchetti."),
            ReplyRule::new(&["machu", "peru"], "🏔️ Machu Picchu è un'esperienza mistica! Ti piacerebbe esplorare le Ande?"),
            ReplyRule::new(&["islanda", "iceland"], "❄️ L'Islanda offre aurore boreali spettacolari! Quando vorresti partire?"),
            ReplyRule::new(&["prezzo", "costo", "economico"], "💰 Santorini €1800 | Tokyo €2500 | Machu Picchu €2200 | Islanda €2800 | Maldive €3500. Quale ti interessa?"),
            ReplyRule::new(&["viaggio"], "✈️ Perfetto! Abbiamo 5 destinazioni incredibili. Clicca sui pin colorati sul globo per esplorare!"),
            ReplyRule::new(&["test"], "🔧 Sistema funzionante! Pronto per pianificare il tuo viaggio da sogno?"),
        ],
        default_template: "🌍 Ho ricevuto: '{input}'. Come posso aiutarti con i tuoi viaggi?".to_string(),
    }
}

/// Persona prompt for the live completion provider
pub fn default_system_prompt() -> String {
    "Sei l'assistente AI di Ares Travel, un'agenzia di viaggi premium che ama creare esperienze indimenticabili!

Le nostre destinazioni disponibili sono:
- Tokyo, Giappone (€2500) - Metropoli futuristica e cultura millenaria
- Santorini, Grecia (€1800) - Tramonti mozzafiato sul Mar Egeo
- Machu Picchu, Perù (€2200) - Cittadella inca nelle Ande
- Maldive (€3500) - Atolli paradisiaci nell'Oceano Indiano
- Reykjavík, Islanda (€2800) - Aurora boreale e paesaggi vulcanici

Il tuo stile è caloroso, entusiasta e sempre propositivo. Rispondi con varietà e creatività.
Saluto iniziale: \"Benvenuto! Posso consigliarti 2 mete basate sul periodo e budget. Preferisci mare o città?\"
Ogni risposta deve includere una chiamata all'azione: focus sul globe, apertura pacchetti, o richiesta dettagli.
Usa emojis per rendere più vivace la conversazione e mantieni il tono entusiasta ma professionale.

Mantieni le risposte coinvolgenti (2-3 frasi) e sempre con una proposta d'azione."
        .to_string()
}
