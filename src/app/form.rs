//! Interactive property form over any line-based reader.
//!
//! Mirrors the web form's widgets: numbers are clamped into their declared
//! ranges, yes/no questions only accept yes/no, and an empty line keeps the
//! default. Once input runs out, every remaining field takes its default.

use std::io::{BufRead, Write};
use std::ops::RangeInclusive;

use crate::domain::model::{clamp_area, clamp_count, limits, Answer, PropertyInput};
use crate::utils::error::Result;

pub fn collect_input<R: BufRead, W: Write>(reader: R, writer: W) -> Result<PropertyInput> {
    let mut form = Form {
        reader,
        writer,
        exhausted: false,
    };

    writeln!(form.writer, "✨ Property Specifications")?;

    let input = PropertyInput {
        area: form.ask_area()?,
        bedrooms: form.ask_count("🛏️ Bedrooms", &limits::BEDROOMS, limits::DEFAULT_BEDROOMS)?,
        bathrooms: form.ask_count("🛁 Bathrooms", &limits::BATHROOMS, limits::DEFAULT_BATHROOMS)?,
        stories: form.ask_count("🏢 Stories", &limits::STORIES, limits::DEFAULT_STORIES)?,
        mainroad: form.ask_choice("🛣️ Main Road Access")?,
        guestroom: form.ask_choice("🚪 Guest Room")?,
        basement: form.ask_choice("🕳️ Basement")?,
        hotwaterheating: form.ask_choice("♨️ Hot Water Heating")?,
        airconditioning: form.ask_choice("❄️ Air Conditioning")?,
        parking: form.ask_count("🚗 Parking Spaces", &limits::PARKING, limits::DEFAULT_PARKING)?,
        prefarea: form.ask_choice("⭐ Preferred Area")?,
    };

    form.writer.flush()?;
    Ok(input)
}

struct Form<R, W> {
    reader: R,
    writer: W,
    exhausted: bool,
}

impl<R: BufRead, W: Write> Form<R, W> {
    /// `None` once the reader is exhausted or the line is blank.
    fn prompt(&mut self, question: &str) -> Result<Option<String>> {
        if self.exhausted {
            return Ok(None);
        }

        write!(self.writer, "{}: ", question)?;
        self.writer.flush()?;

        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            self.exhausted = true;
            writeln!(self.writer)?;
            return Ok(None);
        }

        let answer = line.trim();
        if answer.is_empty() {
            Ok(None)
        } else {
            Ok(Some(answer.to_string()))
        }
    }

    fn ask_area(&mut self) -> Result<f64> {
        let question = format!(
            "📐 Area (in sq. ft.) [{}-{}, default {}]",
            limits::AREA.start(),
            limits::AREA.end(),
            limits::DEFAULT_AREA
        );
        loop {
            let Some(raw) = self.prompt(&question)? else {
                return Ok(limits::DEFAULT_AREA);
            };
            match raw.parse::<f64>() {
                Ok(area) if area.is_finite() => {
                    let clamped = clamp_area(area);
                    self.note_adjusted(area, clamped)?;
                    return Ok(clamped);
                }
                _ => writeln!(self.writer, "Please enter a number.")?,
            }
        }
    }

    fn ask_count(&mut self, label: &str, range: &RangeInclusive<u32>, default: u32) -> Result<u32> {
        let question = format!(
            "{} [{}-{}, default {}]",
            label,
            range.start(),
            range.end(),
            default
        );
        loop {
            let Some(raw) = self.prompt(&question)? else {
                return Ok(default);
            };
            match raw.parse::<u32>() {
                Ok(value) => {
                    let clamped = clamp_count(value, range);
                    self.note_adjusted(f64::from(value), f64::from(clamped))?;
                    return Ok(clamped);
                }
                Err(_) => writeln!(self.writer, "Please enter a whole number.")?,
            }
        }
    }

    fn ask_choice(&mut self, label: &str) -> Result<Answer> {
        let question = format!("{} [Yes/No, default {}]", label, limits::DEFAULT_ANSWER);
        loop {
            let Some(raw) = self.prompt(&question)? else {
                return Ok(Answer::from(limits::DEFAULT_ANSWER));
            };
            match raw.to_ascii_lowercase().as_str() {
                "yes" | "y" => return Ok(Answer::from(true)),
                "no" | "n" => return Ok(Answer::from(false)),
                _ => writeln!(self.writer, "Please answer Yes or No.")?,
            }
        }
    }

    fn note_adjusted(&mut self, entered: f64, used: f64) -> Result<()> {
        if entered != used {
            writeln!(self.writer, "  (out of range, using {})", used)?;
        }
        Ok(())
    }
}
