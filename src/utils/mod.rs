use crate::models::Team;

/// Minimum `strsim` similarity for a fuzzy team-name hit.
const FUZZY_THRESHOLD: f64 = 0.85;

/// Round to one decimal place, e.g. 2.96 -> 3.0.
pub fn round_to_tenths(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Format a whole-number percentage for display.
pub fn format_percent(value: i32) -> String {
    format!("{}%", value)
}

/// Normalise a team name: lowercase, common club suffixes dropped, punctuation folded.
pub fn normalize_team_name(name: &str) -> String {
    let lowered = format!(" {} ", name.to_lowercase().replace('.', "").replace('-', " "));
    let stripped = [" fc ", " afc ", " sc ", " cf "]
        .iter()
        .fold(lowered, |acc, suffix| acc.replace(suffix, " "));
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Fuzzy team-name match: normalises common suffixes then checks contains-both-ways.
pub fn names_match(a: &str, b: &str) -> bool {
    let a = normalize_team_name(a);
    let b = normalize_team_name(b);
    if a.is_empty() || b.is_empty() {
        return false;
    }
    a == b || a.contains(&b) || b.contains(&a)
}

/// Find a team by id, exact name, loose name, or closest spelling, in that order.
pub fn resolve_team<'a>(teams: &'a [Team], query: &str) -> Option<&'a Team> {
    let query = query.trim();
    if query.is_empty() {
        return None;
    }

    if let Some(team) = teams.iter().find(|t| t.id == query) {
        return Some(team);
    }
    if let Some(team) = teams.iter().find(|t| t.name.eq_ignore_ascii_case(query)) {
        return Some(team);
    }
    if let Some(team) = teams.iter().find(|t| names_match(&t.name, query)) {
        return Some(team);
    }

    let wanted = normalize_team_name(query);
    teams
        .iter()
        .map(|t| (t, strsim::jaro_winkler(&normalize_team_name(&t.name), &wanted)))
        .filter(|(_, score)| *score >= FUZZY_THRESHOLD)
        .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(t, _)| t)
}
