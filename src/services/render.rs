use chrono::{DateTime, FixedOffset, Local, Offset, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::models::{Finding, Recommendation, StatCard, StatisticsBundle};
use crate::utils::format_percent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
pub enum Language {
    #[default]
    #[serde(rename = "en")]
    #[value(name = "en")]
    English,
    #[serde(rename = "pt-br")]
    #[value(name = "pt-br")]
    Portuguese,
}

impl Language {
    fn timestamp_format(self) -> &'static str {
        match self {
            Language::English => "%-m/%-d/%Y, %-I:%M:%S %p",
            Language::Portuguese => "%d/%m/%Y, %H:%M:%S",
        }
    }
}

/// Turns bundles and recommendations into display text.
#[derive(Debug, Clone, Copy)]
pub struct Renderer {
    language: Language,
    offset: FixedOffset,
}

impl Renderer {
    pub fn new(language: Language, offset: FixedOffset) -> Self {
        Self { language, offset }
    }

    /// Renderer using the machine's current UTC offset.
    pub fn local(language: Language) -> Self {
        Self::new(language, Local::now().offset().fix())
    }

    /// Header, one line per finding, then the generation timestamp.
    pub fn render_recommendation(&self, recommendation: &Recommendation) -> Vec<String> {
        let mut lines = Vec::with_capacity(recommendation.findings.len() + 2);
        lines.push(self.header(recommendation.sample_size));
        lines.extend(
            recommendation
                .findings
                .iter()
                .map(|finding| format!("{} {}", finding.tag(), self.render_finding(finding))),
        );
        lines.push(self.timestamp_line(recommendation.generated_at));
        lines
    }

    pub fn render_finding(&self, finding: &Finding) -> String {
        match (self.language, finding) {
            (Language::English, Finding::HomeFavoured { team, probability }) => format!(
                "{} has a high probability of winning ({})",
                team,
                format_percent(*probability)
            ),
            (Language::English, Finding::AwayFavoured { team, probability }) => {
                format!("{} has a good chance of winning ({})", team, format_percent(*probability))
            }
            (Language::English, Finding::DrawLikely { probability }) => format!(
                "Balanced game, a draw is the most likely outcome ({})",
                format_percent(*probability)
            ),
            (Language::English, Finding::OverGoals { count, sample_size }) => format!(
                "Strong chance of Over 2.5 goals (happened in {} of the last {} matches)",
                count, sample_size
            ),
            (Language::English, Finding::UnderGoals) => {
                "More defensive game, consider Under 2.5 goals".to_string()
            }
            (Language::English, Finding::BothTeamsScore { count, sample_size }) => {
                format!("Both teams score frequently ({} of the last {})", count, sample_size)
            }
            (Language::English, Finding::HighCardCount { average_per_match }) => format!(
                "High number of yellow cards expected (average of {:.1} per match)",
                average_per_match
            ),
            (Language::Portuguese, Finding::HomeFavoured { team, probability }) => format!(
                "{} tem alta probabilidade de vitória ({})",
                team,
                format_percent(*probability)
            ),
            (Language::Portuguese, Finding::AwayFavoured { team, probability }) => {
                format!("{} tem boa chance de vitória ({})", team, format_percent(*probability))
            }
            (Language::Portuguese, Finding::DrawLikely { probability }) => format!(
                "Jogo equilibrado, maior probabilidade de empate ({})",
                format_percent(*probability)
            ),
            (Language::Portuguese, Finding::OverGoals { count, sample_size }) => format!(
                "Ótima chance de Over 2.5 gols (aconteceu em {} dos últimos {} jogos)",
                count, sample_size
            ),
            (Language::Portuguese, Finding::UnderGoals) => {
                "Jogo mais defensivo, considere Under 2.5 gols".to_string()
            }
            (Language::Portuguese, Finding::BothTeamsScore { count, sample_size }) => {
                format!("Ambos times marcam frequentemente ({} dos últimos {})", count, sample_size)
            }
            (Language::Portuguese, Finding::HighCardCount { average_per_match }) => format!(
                "Alto número de cartões amarelos esperado (média de {:.1} por jogo)",
                average_per_match
            ),
        }
    }

    /// Cards in the order the results grid shows them.
    pub fn stat_cards(&self, stats: &StatisticsBundle) -> Vec<StatCard> {
        let card = |label: String, value: String| StatCard { label, value };
        let (home, away) = (&stats.home_team, &stats.away_team);

        match self.language {
            Language::English => vec![
                card(format!("{} wins", home), stats.home_wins.to_string()),
                card(format!("{} wins", away), stats.away_wins.to_string()),
                card("Draws".to_string(), stats.draws.to_string()),
                card(format!("Goals ({})", home), stats.home_goals.to_string()),
                card(format!("Goals ({})", away), stats.away_goals.to_string()),
                card("Matches over 2.5".to_string(), stats.over_two_point_five_count.to_string()),
                card("Corners".to_string(), stats.corners.to_string()),
                card("Yellow cards".to_string(), stats.yellow_cards.to_string()),
                card("Red cards".to_string(), stats.red_cards.to_string()),
                card("Both scored".to_string(), stats.both_teams_scored_count.to_string()),
                card(format!("{} win prob.", home), format_percent(stats.home_win_probability)),
                card("Draw prob.".to_string(), format_percent(stats.draw_probability)),
                card(format!("{} win prob.", away), format_percent(stats.away_win_probability)),
            ],
            Language::Portuguese => vec![
                card(format!("Vitórias do {}", home), stats.home_wins.to_string()),
                card(format!("Vitórias do {}", away), stats.away_wins.to_string()),
                card("Empates".to_string(), stats.draws.to_string()),
                card(format!("Gols ({})", home), stats.home_goals.to_string()),
                card(format!("Gols ({})", away), stats.away_goals.to_string()),
                card("Jogos com Over 2.5".to_string(), stats.over_two_point_five_count.to_string()),
                card("Escanteios".to_string(), stats.corners.to_string()),
                card("Cartões Amarelos".to_string(), stats.yellow_cards.to_string()),
                card("Cartões Vermelhos".to_string(), stats.red_cards.to_string()),
                card("Ambos marcaram".to_string(), stats.both_teams_scored_count.to_string()),
                card(format!("Prob. Vitória {}", home), format_percent(stats.home_win_probability)),
                card("Prob. Empate".to_string(), format_percent(stats.draw_probability)),
                card(format!("Prob. Vitória {}", away), format_percent(stats.away_win_probability)),
            ],
        }
    }

    fn header(&self, sample_size: u32) -> String {
        match self.language {
            Language::English => format!("Based on the last {} matches analysed:", sample_size),
            Language::Portuguese => {
                format!("Baseado nos últimos {} jogos analisados:", sample_size)
            }
        }
    }

    fn timestamp_line(&self, at: DateTime<Utc>) -> String {
        let stamp = at.with_timezone(&self.offset).format(self.language.timestamp_format());
        match self.language {
            Language::English => format!("📊 Analysis generated at {}", stamp),
            Language::Portuguese => format!("📊 Análise gerada em {}", stamp),
        }
    }
}
