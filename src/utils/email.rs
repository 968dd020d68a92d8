//! HTML rendering for the ingestion notification emails.

use crate::models::search_query::SearchQuery;
use crate::services::ingest_service::IngestReport;

/// One newly added vacancy as shown in the subscriber digest.
#[derive(Debug, Clone)]
pub struct DigestEntry {
    pub external_id: String,
    pub title: String,
    pub employer_name: String,
    pub employer_open_vacancies: i32,
    pub area: Option<String>,
}

fn escape_html(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Digest sent to the search-query subscriber. Entries are expected to be
/// pre-sorted by employer open-vacancy count, largest first.
pub fn render_query_digest(
    query: &SearchQuery,
    entries: &[DigestEntry],
    top_skills: &[(String, i64)],
) -> String {
    let mut html = String::new();
    html.push_str(&format!(
        "<h2>Новые вакансии по запросу «{}»</h2>\n",
        escape_html(&query.query)
    ));
    html.push_str(&format!("<p>Добавлено вакансий: {}</p>\n", entries.len()));

    html.push_str(
        "<table border=\"1\" cellpadding=\"4\">\n\
         <tr><th>Вакансия</th><th>Работодатель</th>\
         <th>Открытых вакансий</th><th>Регион</th></tr>\n",
    );
    for entry in entries {
        html.push_str(&format!(
            "<tr><td><a href=\"https://hh.ru/vacancy/{}\">{}</a></td>\
             <td>{}</td><td>{}</td><td>{}</td></tr>\n",
            escape_html(&entry.external_id),
            escape_html(&entry.title),
            escape_html(&entry.employer_name),
            entry.employer_open_vacancies,
            escape_html(entry.area.as_deref().unwrap_or("—")),
        ));
    }
    html.push_str("</table>\n");

    if !top_skills.is_empty() {
        html.push_str("<h3>Топ навыков в новых вакансиях</h3>\n");
        html.push_str(
            "<table border=\"1\" cellpadding=\"4\">\n\
             <tr><th>Навык</th><th>Упоминаний</th></tr>\n",
        );
        for (skill, count) in top_skills {
            html.push_str(&format!(
                "<tr><td>{}</td><td>{}</td></tr>\n",
                escape_html(skill),
                count
            ));
        }
        html.push_str("</table>\n");
    }

    html
}

/// Plain run summary for the admin address.
pub fn render_admin_report(report: &IngestReport) -> String {
    let mut html = String::new();
    html.push_str(&format!(
        "<h2>Синхронизация вакансий: «{}»</h2>\n",
        escape_html(&report.query_text)
    ));
    html.push_str(&format!("<p>Идентификатор запуска: {}</p>\n", report.run_id));
    html.push_str("<ul>\n");
    html.push_str(&format!("<li>Получено из API: {}</li>\n", report.total_fetched));
    html.push_str(&format!("<li>Добавлено: {}</li>\n", report.added));
    html.push_str(&format!("<li>Возобновлено: {}</li>\n", report.revived));
    html.push_str(&format!("<li>Отправлено в архив: {}</li>\n", report.archived));
    html.push_str(&format!(
        "<li>Без изменений: {}</li>\n",
        report.skipped_existing
    ));
    html.push_str("</ul>\n");

    if !report.errored.is_empty() {
        html.push_str(&format!(
            "<p>Ошибки обработки ({}): {}</p>\n",
            report.errored.len(),
            escape_html(&report.errored.join(", "))
        ));
    }
    if !report.missing_unknown_status.is_empty() {
        html.push_str(&format!(
            "<p>Статус неизвестен, требуется ручная проверка ({}): {}</p>\n",
            report.missing_unknown_status.len(),
            escape_html(&report.missing_unknown_status.join(", "))
        ));
    }

    html
}
