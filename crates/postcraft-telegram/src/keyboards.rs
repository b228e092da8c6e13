//! Inline keyboards.

use postcraft_models::{AudienceType, RelationshipType, Tone};
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use crate::callbacks::CallbackAction;

fn button(text: impl Into<String>, action: CallbackAction) -> InlineKeyboardButton {
    InlineKeyboardButton::callback(text, action.to_string())
}

pub fn audience_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![AudienceType::ALL
        .iter()
        .map(|a| button(format!("{} {}", a.emoji(), a.label()), CallbackAction::Audience(*a)))
        .collect::<Vec<_>>()])
}

/// One row per tone, recommended tones starred, plus auto and context rows.
pub fn tone_keyboard(recommended: &[Tone]) -> InlineKeyboardMarkup {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = Tone::ALL
        .iter()
        .map(|t| {
            let star = if recommended.contains(t) { " ⭐" } else { "" };
            vec![button(
                format!("{} {}{}", t.emoji(), t.label(), star),
                CallbackAction::Tone(Some(*t)),
            )]
        })
        .collect();
    rows.push(vec![button("🤖 Let the AI choose", CallbackAction::Tone(None))]);
    rows.push(vec![button("📝 Add context first", CallbackAction::AddContext)]);
    InlineKeyboardMarkup::new(rows)
}

pub fn review_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![
            button("✅ Approve", CallbackAction::Approve),
            button("🔄 Regenerate", CallbackAction::Regenerate),
        ],
        vec![
            button("✏️ Edit", CallbackAction::Edit),
            button("🗑 Discard", CallbackAction::Discard),
        ],
    ])
}

pub fn relationship_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(
        RelationshipType::FOLLOW_UPS
            .chunks(2)
            .map(|pair| {
                pair.iter()
                    .map(|r| button(r.label(), CallbackAction::Relationship(*r)))
                    .collect()
            })
            .collect::<Vec<Vec<_>>>(),
    )
}

pub fn skip_context_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![button("⏭ Skip", CallbackAction::SkipContext)]])
}

/// Context was added; generate with the model's tone choice or go back to tones.
pub fn after_context_keyboard(recommended: &[Tone]) -> InlineKeyboardMarkup {
    let mut keyboard = tone_keyboard(recommended);
    keyboard.inline_keyboard.pop();
    keyboard
        .inline_keyboard
        .push(vec![button("🚀 Generate", CallbackAction::Generate)]);
    keyboard
}

pub fn batch_approve_keyboard(index: usize) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![button(
        format!("✅ Approve #{}", index + 1),
        CallbackAction::BatchApprove(index),
    )]])
}
