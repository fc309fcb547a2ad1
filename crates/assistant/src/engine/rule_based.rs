//! Keyword-driven canned replies with category fallback.
//!
//! Matching is purely lexical. Lookup order is fixed: keyword categories,
//! then topic phrases, then time-of-day greetings, then the question
//! heuristic, and finally a random "unknown" reply.

use super::ResponseEngine;
use async_trait::async_trait;
use chrono::{Datelike, Local, NaiveDateTime, Timelike};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Greeting,
    Farewell,
    Thanks,
    Weather,
    Time,
    Date,
    Capabilities,
    Unknown,
}

impl Category {
    /// Scan order; the first category with a matching keyword wins.
    pub const MATCH_ORDER: [Category; 7] = [
        Category::Greeting,
        Category::Farewell,
        Category::Thanks,
        Category::Weather,
        Category::Time,
        Category::Date,
        Category::Capabilities,
    ];

    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            Category::Greeting => &[
                "hallo",
                "hi",
                "guten tag",
                "guten morgen",
                "hey",
                "servus",
                "moin",
            ],
            Category::Farewell => &[
                "tschüss",
                "auf wiedersehen",
                "bye",
                "ciao",
                "bis später",
                "bis bald",
            ],
            Category::Thanks => &["danke", "vielen dank", "besten dank", "dankeschön"],
            Category::Weather => &["wetter", "temperatur", "regnet", "schneit", "sonne"],
            Category::Time => &["uhrzeit", "wie spät", "wie viel uhr"],
            Category::Date => &["datum", "welcher tag", "tag heute", "kalender"],
            Category::Capabilities => &[
                "was kannst du",
                "fähigkeiten",
                "funktionen",
                "helfen",
                "hilf mir",
                "was machst du",
            ],
            Category::Unknown => &[],
        }
    }

    /// Candidate replies. Time and date replies are rendered from `now`.
    pub fn replies(&self, now: &NaiveDateTime) -> Vec<String> {
        match self {
            Category::Greeting => owned(&[
                "Hallo! Wie kann ich dir heute helfen?",
                "Guten Tag! Wobei kann ich behilflich sein?",
                "Hi! Ich bin dein KI-Assistent. Was möchtest du wissen?",
                "Willkommen zurück! Wie kann ich dir assistieren?",
            ]),
            Category::Farewell => owned(&[
                "Bis bald! Melde dich, wenn du weitere Hilfe brauchst.",
                "Auf Wiedersehen! Ich bin hier, wenn du mich brauchst.",
                "Tschüss! Komm jederzeit zurück, wenn du Fragen hast.",
                "Bis zum nächsten Mal! Schönen Tag noch!",
            ]),
            Category::Thanks => owned(&[
                "Gerne! Ich freue mich, helfen zu können.",
                "Kein Problem! Gibt es noch etwas, womit ich dir helfen kann?",
                "Immer wieder gern! Weitere Fragen?",
                "Es ist mir ein Vergnügen zu helfen!",
            ]),
            Category::Weather => owned(&[
                "Ich kann leider keine Echtzeit-Wetterdaten abrufen, aber ich empfehle dir wetter.com oder eine ähnliche Webseite zu besuchen.",
                "Für aktuelle Wetterinformationen besuche bitte eine Wetter-App oder -Webseite.",
                "Wetterdaten kann ich nicht direkt anzeigen, aber ich kann dir helfen, eine Wetterseite zu öffnen.",
            ]),
            Category::Time => vec![
                format!("Die aktuelle Systemzeit ist {}.", now.format("%H:%M:%S")),
                format!("Es ist jetzt {} Uhr.", now.format("%H:%M")),
                format!("Die Uhrzeit beträgt {} Uhr.", now.format("%H:%M")),
            ],
            Category::Date => vec![
                format!("Heute ist der {}.", now.format("%d.%m.%Y")),
                format!("Das heutige Datum ist {}.", long_german_date(now)),
                format!("Wir haben den {}.", now.format("%d.%m.%Y")),
            ],
            Category::Capabilities => owned(&[
                "Ich kann dir mit grundlegenden Informationen helfen, Programme öffnen, Webseiten aufrufen und einfache Fragen beantworten.",
                "Meine Fähigkeiten umfassen das Öffnen von Programmen, Websuche, und die Beantwortung einfacher Fragen.",
                "Ich kann dir bei verschiedenen Aufgaben helfen, wie Websuche, Programme starten und Informationen bereitstellen.",
            ]),
            Category::Unknown => owned(&[
                "Entschuldige, ich bin mir nicht sicher, wie ich darauf antworten soll. Kann ich dir mit etwas anderem helfen?",
                "Diese Frage ist für mich schwierig zu beantworten. Kannst du sie anders formulieren?",
                "Ich verstehe deine Anfrage leider nicht vollständig. Magst du es anders ausdrücken?",
                "Darauf habe ich leider keine passende Antwort. Gibt es etwas anderes, womit ich dir helfen kann?",
            ]),
        }
    }
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

const GERMAN_MONTHS: [&str; 12] = [
    "Januar",
    "Februar",
    "März",
    "April",
    "Mai",
    "Juni",
    "Juli",
    "August",
    "September",
    "Oktober",
    "November",
    "Dezember",
];

fn long_german_date(now: &NaiveDateTime) -> String {
    format!(
        "{:02}. {} {}",
        now.day(),
        GERMAN_MONTHS[now.month0() as usize],
        now.year()
    )
}

/// Topic phrase -> fixed explanation, scanned in this order
pub const TOPICS: [(&str, &str); 6] = [
    (
        "computer",
        "Computer sind elektronische Geräte, die Daten verarbeiten und speichern können. Sie bestehen aus Hardware (physische Komponenten) und Software (Programme und Betriebssysteme). Computer sind für viele Aufgaben unerlässlich geworden, von einfachen Berechnungen bis hin zu komplexen Simulationen und künstlicher Intelligenz.",
    ),
    (
        "internet",
        "Das Internet ist ein weltweites Netzwerk aus miteinander verbundenen Computern, das den Austausch von Informationen und Kommunikation ermöglicht. Es wurde in den 1960er Jahren entwickelt und hat sich zu einem integralen Bestandteil des modernen Lebens entwickelt, der E-Mails, Webseiten, soziale Medien und vieles mehr umfasst.",
    ),
    (
        "künstliche intelligenz",
        "Künstliche Intelligenz (KI) bezieht sich auf Computersysteme, die Aufgaben ausführen können, die normalerweise menschliche Intelligenz erfordern. Dazu gehören Spracherkennung, Entscheidungsfindung, Übersetzung und vieles mehr. KI kann in regelbasierte Systeme und maschinelles Lernen unterteilt werden, wobei letzteres Algorithmen verwendet, die aus Daten lernen können.",
    ),
    (
        "python",
        "Python ist eine interpretierte, hochrangige Programmiersprache, die für ihre einfache Lesbarkeit und vielseitige Anwendbarkeit bekannt ist. Sie wird häufig in Bereichen wie Webentwicklung, Datenanalyse, künstliche Intelligenz und wissenschaftliche Berechnungen eingesetzt.",
    ),
    (
        "gesundheit",
        "Gesundheit umfasst das körperliche, geistige und soziale Wohlbefinden. Eine gesunde Lebensweise beinhaltet ausgewogene Ernährung, regelmäßige körperliche Aktivität, ausreichend Schlaf und Stressbewältigung. Bei gesundheitlichen Bedenken solltest du immer einen Arzt konsultieren.",
    ),
    (
        "musik",
        "Musik ist eine Kunstform, die Töne und Klänge in einer strukturierten und bewussten Weise organisiert. Sie kann verschiedene Emotionen ausdrücken und ist in allen Kulturen weltweit zu finden. Es gibt zahlreiche Musikgenres wie Klassik, Rock, Pop, Jazz, Hip-Hop und elektronische Musik.",
    ),
];

pub const MORNING_REPLY: &str = "Guten Morgen! Wie kann ich dir an diesem Morgen behilflich sein?";
pub const AFTERNOON_REPLY: &str = "Guten Tag! Wie geht es dir heute?";
pub const EVENING_REPLY: &str = "Guten Abend! Wie kann ich dir an diesem Abend helfen?";
pub const QUESTION_REPLY: &str = "Das ist eine interessante Frage. Ich habe zwar keine Verbindung zum Internet, kann dir aber mit grundlegenden Informationen helfen. Könntest du deine Frage konkretisieren oder nach einem bestimmten Thema fragen?";

const QUESTION_WORDS: [&str; 7] = ["wie", "was", "warum", "weshalb", "wo", "wann", "wer"];

/// Deterministic-order keyword matcher. Only the reply pick within a
/// category is random.
pub struct RuleBasedEngine {
    rng: Mutex<StdRng>,
}

impl RuleBasedEngine {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Reproducible reply picks for tests
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Reply for `text` as if the local clock read `now`.
    pub fn respond_at(&self, text: &str, now: &NaiveDateTime) -> String {
        let lowered = text.to_lowercase();

        if let Some(category) = match_category(&lowered) {
            tracing::debug!(?category, "keyword match");
            return self.pick(category, now);
        }

        if let Some(reply) = match_topic(&lowered) {
            return reply.to_string();
        }

        if let Some(reply) = time_of_day_reply(&lowered, now.hour()) {
            return reply.to_string();
        }

        if text.contains('?') && QUESTION_WORDS.iter().any(|w| lowered.contains(w)) {
            return QUESTION_REPLY.to_string();
        }

        self.pick(Category::Unknown, now)
    }

    fn pick(&self, category: Category, now: &NaiveDateTime) -> String {
        let replies = category.replies(now);
        let mut rng = self.rng.lock();
        replies
            .choose(&mut *rng)
            .cloned()
            .unwrap_or_default()
    }
}

impl Default for RuleBasedEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// First category (in `MATCH_ORDER`) with a keyword contained in `lowered`
pub fn match_category(lowered: &str) -> Option<Category> {
    Category::MATCH_ORDER
        .into_iter()
        .find(|c| c.keywords().iter().any(|k| lowered.contains(k)))
}

pub fn match_topic(lowered: &str) -> Option<&'static str> {
    TOPICS
        .iter()
        .find(|(phrase, _)| lowered.contains(phrase))
        .map(|(_, reply)| *reply)
}

fn time_of_day_reply(lowered: &str, hour: u32) -> Option<&'static str> {
    if hour < 12 && lowered.contains("morgen") {
        Some(MORNING_REPLY)
    } else if (12..18).contains(&hour) && lowered.contains("tag") {
        Some(AFTERNOON_REPLY)
    } else if hour >= 18 && (lowered.contains("abend") || lowered.contains("nacht")) {
        Some(EVENING_REPLY)
    } else {
        None
    }
}

#[async_trait]
impl ResponseEngine for RuleBasedEngine {
    fn name(&self) -> &'static str {
        "rule_based"
    }

    /// History is not consulted.
    async fn generate(&self, text: &str, _history: &[String]) -> String {
        self.respond_at(text, &Local::now().naive_local())
    }
}
