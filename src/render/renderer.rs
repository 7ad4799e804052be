use std::collections::HashSet;

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
};

use crate::game::{GameConfig, Observation, Position};
use crate::metrics::GameMetrics;

/// Draws one board snapshot plus the stats header and controls footer
pub struct BoardView {
    config: GameConfig,
}

impl BoardView {
    pub fn new(config: GameConfig) -> Self {
        Self { config }
    }

    pub fn render(&self, frame: &mut Frame, obs: &Observation, metrics: &GameMetrics, fps: u32) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Min(0),    // Board
                Constraint::Length(3), // Footer
            ])
            .split(frame.area());

        frame.render_widget(self.stats(obs, metrics), chunks[0]);
        frame.render_widget(self.grid(obs), chunks[1]);
        frame.render_widget(self.controls(fps), chunks[2]);
    }

    fn grid(&self, obs: &Observation) -> Paragraph<'static> {
        let block = self.config.block_size;
        let head = obs.head();
        let body: HashSet<Position> = obs.snake.iter().copied().collect();

        let lines: Vec<Line> = (0..self.config.rows())
            .map(|row| {
                let spans: Vec<Span> = (0..self.config.columns())
                    .map(|col| {
                        let pos = Position::new(col * block, row * block);
                        if pos == head {
                            Span::styled(
                                "■ ",
                                Style::default()
                                    .fg(Color::Cyan)
                                    .add_modifier(Modifier::BOLD),
                            )
                        } else if body.contains(&pos) {
                            Span::styled("□ ", Style::default().fg(Color::Green))
                        } else if pos == obs.food {
                            Span::styled(
                                "O ",
                                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                            )
                        } else {
                            Span::styled(". ", Style::default().fg(Color::DarkGray))
                        }
                    })
                    .collect();
                Line::from(spans)
            })
            .collect();

        Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Double)
                    .border_style(Style::default().fg(Color::White))
                    .title(" Q-Snake "),
            )
            .alignment(Alignment::Center)
    }

    fn stats(&self, obs: &Observation, metrics: &GameMetrics) -> Paragraph<'static> {
        let label = Style::default().fg(Color::Yellow);
        let value = Style::default().fg(Color::White);

        let mut spans = vec![
            Span::styled("Episode: ", label),
            Span::styled(metrics.episode.to_string(), value),
            Span::raw("    "),
            Span::styled("Score: ", label),
            Span::styled(
                obs.score().to_string(),
                value.add_modifier(Modifier::BOLD),
            ),
            Span::raw("    "),
            Span::styled("Steps: ", label),
            Span::styled(obs.steps.to_string(), value),
            Span::raw("    "),
            Span::styled("High: ", label),
            Span::styled(metrics.high_score.to_string(), value),
            Span::raw("    "),
            Span::styled("Time: ", label),
            Span::styled(metrics.format_time(), value),
        ];
        if let Some(last) = metrics.last_score {
            spans.push(Span::raw("    "));
            spans.push(Span::styled("Last: ", label));
            spans.push(Span::styled(last.to_string(), value));
        }

        Paragraph::new(Line::from(spans)).alignment(Alignment::Center)
    }

    fn controls(&self, fps: u32) -> Paragraph<'static> {
        let text = Line::from(vec![
            Span::styled("+/-", Style::default().fg(Color::Cyan)),
            Span::raw(format!(" speed ({fps} fps) | ")),
            Span::styled("Q", Style::default().fg(Color::Red)),
            Span::raw(" to quit"),
        ]);

        Paragraph::new(text).alignment(Alignment::Center)
    }
}
