//! Valence lexicon: the AFINN-165 English word list merged with gambling/recovery
//! vocabulary in Russian. Domain entries win on conflict.

use std::collections::HashMap;
use std::sync::OnceLock;

static LEXICON: OnceLock<HashMap<&'static str, i32>> = OnceLock::new();

/// AFINN-165 general English word list, `word<TAB>valence` per line
const AFINN_165: &str = include_str!("data/afinn-165.tsv");

const DOMAIN: &[(&str, i32)] = &[
    // losses, relapse, shame
    ("проиграл", -4), ("проиграла", -4), ("проигрыш", -4), ("проигрыши", -4),
    ("слив", -3), ("слил", -3), ("слила", -3), ("слито", -3),
    ("долг", -4), ("долги", -4), ("задолженность", -4),
    ("ставка", -2), ("ставки", -2), ("поставил", -2),
    ("казино", -3), ("слоты", -3), ("рулетка", -3), ("букмекер", -2),
    ("зависимость", -3), ("зависим", -3), ("аддикция", -3),
    ("соблазн", -2), ("желание", -1), ("позыв", -2), ("тяга", -3),
    ("сорвался", -4), ("сорвалась", -4), ("срыв", -4),
    ("стыд", -3), ("стыдно", -3), ("вина", -3), ("виноват", -3),
    ("отчаяние", -4), ("безнадёжно", -4), ("безнадежно", -4),
    ("депрессия", -4), ("тревога", -3), ("паника", -4),
    ("бессонница", -2), ("не спал", -2), ("не спала", -2),
    ("скрываю", -3), ("обман", -3), ("соврал", -3), ("солгал", -3),
    ("кредит", -3), ("займ", -3), ("занял", -3),
    ("потерял", -3), ("потеряла", -3), ("потеря", -3),
    ("злость", -3), ("злюсь", -3), ("раздражение", -2),
    ("одиночество", -3), ("одинок", -3), ("одинока", -3),
    ("алкоголь", -2), ("пил", -2), ("выпил", -2), ("пьяный", -3),
    ("ужасно", -4), ("плохо", -3), ("тяжело", -2), ("больно", -3),
    ("реклама", -1), ("спам", -1),
    // resistance, support, gratitude
    ("устоял", 4), ("устояла", 4), ("удержался", 4), ("удержалась", 4),
    ("выдержал", 4), ("выдержала", 4), ("справился", 4), ("справилась", 4),
    ("свобода", 3), ("свободен", 3), ("свободна", 3),
    ("прогресс", 3), ("достижение", 3), ("победа", 4),
    ("контроль", 2), ("самоконтроль", 3),
    ("поддержка", 3), ("помощь", 2), ("терапия", 2), ("психолог", 2),
    ("спорт", 2), ("тренировка", 2), ("прогулка", 2), ("медитация", 3),
    ("семья", 2), ("друзья", 2), ("близкие", 2),
    ("спокойствие", 3), ("радость", 4), ("счастье", 4), ("гордость", 4),
    ("надежда", 3), ("вера", 2), ("мотивация", 3),
    ("хорошо", 3), ("отлично", 4), ("замечательно", 4), ("прекрасно", 4),
    ("день", 1), ("чистый", 2), ("серия", 2),
    ("сэкономил", 3), ("сэкономила", 3), ("накопил", 3),
    ("благодарен", 3), ("благодарна", 3), ("спасибо", 2),
];

/// Tokens that flip the valence of the following word
const NEGATORS: &[&str] = &[
    "not", "no", "never", "don't", "dont", "doesn't", "didn't", "isn't", "wasn't", "can't",
    "cant", "won't", "without", "не", "нет",
];

pub fn lexicon() -> &'static HashMap<&'static str, i32> {
    LEXICON.get_or_init(|| base_entries().chain(DOMAIN.iter().copied()).collect())
}

fn base_entries() -> impl Iterator<Item = (&'static str, i32)> {
    AFINN_165.lines().filter_map(|line| {
        let (term, value) = line.split_once('\t')?;
        Some((term.trim(), value.trim().parse().ok()?))
    })
}

/// Valence of a single word or two-word phrase
pub fn valence(term: &str) -> Option<i32> {
    lexicon().get(term).copied()
}

pub fn is_negator(token: &str) -> bool {
    NEGATORS.contains(&token)
}
