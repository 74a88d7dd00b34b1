use engine::{ClockSnapshot, Command, MediaKind, ViewerConfig, coerce_number};
use iced::widget::{button, column, row, text, text_input};
use iced::{Element, Length};

/// Editable numeric inputs of the side panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Width,
    Height,
    Start,
    End,
}

impl Field {
    pub const ALL: [Field; 4] = [Field::Width, Field::Height, Field::Start, Field::End];

    fn label(self) -> &'static str {
        match self {
            Field::Width => "Width",
            Field::Height => "Height",
            Field::Start => "Start (s)",
            Field::End => "End (s)",
        }
    }

    fn command(self, value: i64) -> Command {
        match self {
            Field::Width => Command::SetWidth(value),
            Field::Height => Command::SetHeight(value),
            Field::Start => Command::SetStart(value),
            Field::End => Command::SetEnd(value),
        }
    }
}

/// Raw text of each numeric field, kept as typed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumericFields {
    width: String,
    height: String,
    start: String,
    end: String,
}

impl NumericFields {
    pub fn from_config(config: &ViewerConfig) -> Self {
        Self {
            width: config.width.to_string(),
            height: config.height.to_string(),
            start: config.start.to_string(),
            end: config.end.to_string(),
        }
    }

    pub fn text(&self, field: Field) -> &str {
        match field {
            Field::Width => &self.width,
            Field::Height => &self.height,
            Field::Start => &self.start,
            Field::End => &self.end,
        }
    }

    /// Stores the typed text and returns the engine command for it.
    ///
    /// Text that does not coerce to a number is kept in the field but yields
    /// no command, leaving the engine value unchanged.
    pub fn set(&mut self, field: Field, text: String) -> Option<Command> {
        let value = coerce_number(&text);
        let slot = match field {
            Field::Width => &mut self.width,
            Field::Height => &mut self.height,
            Field::Start => &mut self.start,
            Field::End => &mut self.end,
        };
        *slot = text;
        value.map(|value| field.command(value))
    }
}

/// Messages the side panel can produce.
#[derive(Debug, Clone)]
pub enum PanelMessage {
    ImportPressed,
    PlayPausePressed,
    FieldChanged(Field, String),
}

pub fn view<'a>(
    fields: &'a NumericFields,
    clock: &ClockSnapshot,
    kind: Option<MediaKind>,
    status: &'a str,
) -> Element<'a, PanelMessage> {
    let mut panel = column![button("Import Media").on_press(PanelMessage::ImportPressed)]
        .spacing(12)
        .padding(16)
        .width(Length::Fixed(220.0));

    // Only video playback has a visible play/pause trigger.
    if kind == Some(MediaKind::Video) {
        let label = if clock.is_running() { "Pause" } else { "Play" };
        panel = panel.push(button(label).on_press(PanelMessage::PlayPausePressed));
    }

    for field in Field::ALL {
        panel = panel.push(
            row![
                text(field.label()).width(Length::Fixed(72.0)),
                text_input("0", fields.text(field))
                    .on_input(move |text| PanelMessage::FieldChanged(field, text)),
            ]
            .spacing(8),
        );
    }

    panel
        .push_maybe(clock.readout().map(|readout| text(readout).size(20)))
        .push(text(status).size(12))
        .into()
}

#[cfg(test)]
mod tests {
    use engine::{Command, ViewerConfig};

    use super::{Field, NumericFields};

    #[test]
    fn fields_start_from_config_values() {
        let fields = NumericFields::from_config(&ViewerConfig::default());

        assert_eq!(fields.text(Field::Width), "1200");
        assert_eq!(fields.text(Field::Height), "800");
        assert_eq!(fields.text(Field::Start), "0");
        assert_eq!(fields.text(Field::End), "10");
    }

    #[test]
    fn typed_text_maps_to_engine_commands() {
        let mut fields = NumericFields::from_config(&ViewerConfig::default());

        assert_eq!(
            fields.set(Field::Width, String::from("640")),
            Some(Command::SetWidth(640))
        );
        assert_eq!(
            fields.set(Field::End, String::from("7.9")),
            Some(Command::SetEnd(7))
        );
        assert_eq!(
            fields.set(Field::Start, String::new()),
            Some(Command::SetStart(0))
        );
    }

    #[test]
    fn non_numeric_text_is_kept_but_sends_nothing() {
        let mut fields = NumericFields::from_config(&ViewerConfig::default());

        let command = fields.set(Field::Height, String::from("tall"));

        assert_eq!(command, None);
        assert_eq!(fields.text(Field::Height), "tall");
    }
}
