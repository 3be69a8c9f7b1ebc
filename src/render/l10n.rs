//! UI strings and date formatting per language.
//!
//! Lookups fall back to the key itself, so English needs almost no entries.

use chrono::{Datelike, NaiveDate};

const RU: &[(&str, &str)] = &[
    ("lang-en", "English version"),
    ("lang-fi", "Suomeksi"),
    ("Back to Top", "Наверх"),
    ("Previous", "Назад"),
    ("Next", "Далее"),
    ("Home", "Домой"),
    ("Published on", "Опубликовано"),
    ("Updated on", "Обновлено"),
    ("Continue reading", "Читать дальше"),
    ("Map", "Карта"),
    ("Places", "Места"),
    ("Blog", "Блог"),
    ("Articles", "Статьи"),
    ("Contents", "Содержание"),
    ("About Website", "О сайте"),
    ("Read more", "Подробнее"),
    ("Address", "Адрес"),
    ("Season", "Сезон"),
    ("Access", "Как добраться"),
    ("Links", "Ссылки"),
    ("Page", "Страница"),
    ("Zoom in to see less notable places", "Приблизьте карту, чтобы увидеть больше мест"),
];

const EN: &[(&str, &str)] = &[
    ("lang-ru", "Русская версия"),
    ("lang-fi", "Suomeksi"),
];

const FI: &[(&str, &str)] = &[
    ("lang-en", "In English"),
    ("lang-ru", "Русская версия"),
    ("Back to Top", "Ylös"),
    ("Previous", "Edellinen"),
    ("Next", "Seuraava"),
    ("Home", "Etusivu"),
    ("Published on", "Julkaistu"),
    ("Updated on", "Päivitetty"),
    ("Continue reading", "Jatka lukemista"),
    ("Map", "Kartta"),
    ("Places", "Paikat"),
    ("Blog", "Blogi"),
    ("Articles", "Artikkelit"),
    ("Contents", "Sisältö"),
    ("About Website", "Sivustosta"),
    ("Read more", "Lue lisää"),
    ("Address", "Osoite"),
    ("Season", "Kausi"),
    ("Access", "Saapuminen"),
    ("Links", "Linkit"),
    ("Page", "Sivu"),
    ("Zoom in to see less notable places", "Lähennä karttaa nähdäksesi lisää paikkoja"),
];

fn table(lang: &str) -> &'static [(&'static str, &'static str)] {
    match lang {
        "ru" => RU,
        "fi" => FI,
        "en" => EN,
        _ => &[],
    }
}

/// Translate `key` into `lang`, or return it unchanged.
pub fn tr<'a>(key: &'a str, lang: &str) -> &'a str {
    table(lang)
        .iter()
        .find(|(k, _)| *k == key)
        .map_or(key, |(_, v)| *v)
}

const MONTHS_EN: [&str; 12] = [
    "January", "February", "March", "April", "May", "June", "July", "August", "September",
    "October", "November", "December",
];

// Genitive, as used after a day number
const MONTHS_RU: [&str; 12] = [
    "января", "февраля", "марта", "апреля", "мая", "июня", "июля", "августа", "сентября",
    "октября", "ноября", "декабря",
];

// Partitive, as used after an ordinal day
const MONTHS_FI: [&str; 12] = [
    "tammikuuta", "helmikuuta", "maaliskuuta", "huhtikuuta", "toukokuuta", "kesäkuuta",
    "heinäkuuta", "elokuuta", "syyskuuta", "lokakuuta", "marraskuuta", "joulukuuta",
];

/// Long date in the language's usual style.
///
/// ```text
/// en  February 1, 2020
/// ru  1 февраля 2020 г.
/// fi  1. helmikuuta 2020
/// ```
pub fn format_date(date: NaiveDate, lang: &str) -> String {
    let (day, month, year) = (date.day(), date.month0() as usize, date.year());
    match lang {
        "ru" => format!("{day} {} {year} г.", MONTHS_RU[month]),
        "fi" => format!("{day}. {} {year}", MONTHS_FI[month]),
        _ => format!("{} {day}, {year}", MONTHS_EN[month]),
    }
}
