//! Topics shipped with the trainer.

use crate::model::{Level, Topic};

const BUILTIN: [(&str, &str, &str); 3] = [
    (
        "Wissenschaft: Klimawandel",
        "C1",
        "Der Klimawandel ist eine der größten Herausforderungen unserer Zeit. \
         Wissenschaftler warnen vor den irreversiblen Folgen der globalen Erwärmung. \
         Wir müssen dringend Maßnahmen ergreifen, um den CO2-Ausstoß zu reduzieren.",
    ),
    (
        "Dubai Schokolade (Viral Trend)",
        "B2",
        "Außen Schokolade und innen süße Pistaziencreme: Dubai-Schokolade kostet \
         durchschnittlich rund sieben Euro pro 100 Gramm und gilt als süßer Luxus. \
         Die Kombination aus knusprigem Teigfäden und cremiger Füllung macht sie so besonders. \
         In sozialen Netzwerken ist sie momentan der absolute Renner.",
    ),
    (
        "Wirtschaft: Die Inflation",
        "B2",
        "Die Inflation hat in den letzten Monaten stark zugenommen. \
         Viele Verbraucher sorgen sich um die steigenden Preise für Lebensmittel und Energie. \
         Die Zentralbank versucht, durch Zinserhöhungen gegenzusteuern.",
    ),
];

/// The built-in topics, in display order.
#[must_use]
pub fn builtin_topics() -> Vec<Topic> {
    BUILTIN
        .iter()
        .filter_map(|(title, level, text)| Topic::new(*title, Level::parse(*level), *text).ok())
        .collect()
}
