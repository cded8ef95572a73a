//! Localized user-facing message catalog.
//!
//! Every reply the orchestrator emits is rendered here, keyed by the
//! session language. Traditional Chinese sessions receive Simplified
//! Chinese output (see [`Language::response_language`]).

use crate::conflict::ConflictRecord;
use crate::draft::SlotField;
use crate::event::EventRequest;
use crate::language::Language;

/// Greeting emitted by `start_session`.
pub fn greeting(language: Language) -> String {
    match language.response_language() {
        Language::En => "Hello! What would you like to schedule?".to_string(),
        _ => "你好！想安排什么日程？".to_string(),
    }
}

/// Prompt asking for the slots still missing from the draft.
///
/// Deterministic for a given missing set, so re-asking after a no-op turn
/// repeats the outstanding question unchanged.
pub fn ask_missing(missing: &[SlotField], language: Language) -> String {
    match language.response_language() {
        Language::En => {
            let parts: Vec<&str> = missing
                .iter()
                .map(|field| match field {
                    SlotField::Title => "what the event is about",
                    SlotField::Date => "the date",
                    SlotField::StartTime => "the start time",
                })
                .collect();
            format!("Please tell me {}.", parts.join(" and "))
        }
        _ => {
            let parts: Vec<&str> = missing
                .iter()
                .map(|field| match field {
                    SlotField::Title => "日程的主题",
                    SlotField::Date => "日期",
                    SlotField::StartTime => "开始时间",
                })
                .collect();
            format!("请告诉我{}。", parts.join("和"))
        }
    }
}

/// Renegotiation prompt for a detected conflict.
pub fn conflict_prompt(conflict: &ConflictRecord, language: Language) -> String {
    match language.response_language() {
        Language::En => format!(
            "That time overlaps with \"{}\" at {}. What time works better?",
            conflict.conflicting_title,
            conflict.conflicting_start.format("%-I:%M %p"),
        ),
        _ => format!(
            "这个时间与“{}”（{}）冲突。换个什么时间比较好？",
            conflict.conflicting_title,
            conflict.conflicting_start.format("%H:%M"),
        ),
    }
}

/// Confirmation emitted after a successful commit.
pub fn confirmation(event: &EventRequest, language: Language) -> String {
    match language.response_language() {
        Language::En => format!(
            "Done! \"{}\" is scheduled for {} ({} minutes).",
            event.title,
            event.start.format("%A, %B %-d at %-I:%M %p"),
            event.duration_minutes,
        ),
        _ => format!(
            "好的！“{}”已安排在 {}（{} 分钟）。",
            event.title,
            event.start.format("%Y-%m-%d %H:%M"),
            event.duration_minutes,
        ),
    }
}

/// Generic retry prompt when the parsing capability is unavailable.
pub fn parse_retry(language: Language) -> String {
    match language.response_language() {
        Language::En => {
            "Sorry, I had trouble understanding that. Could you say it again?".to_string()
        }
        _ => "抱歉，我刚才没能理解。可以再说一遍吗？".to_string(),
    }
}

/// Retry prompt when the calendar capability fails transiently.
pub fn calendar_retry(language: Language) -> String {
    match language.response_language() {
        Language::En => {
            "I couldn't reach your calendar just now. Please try again in a moment.".to_string()
        }
        _ => "我暂时无法访问你的日历，请稍后再试。".to_string(),
    }
}

/// Prompt when the calendar capability reports no active login.
pub fn login_required(language: Language) -> String {
    match language.response_language() {
        Language::En => {
            "Please finish logging in to your calendar, then ask me to try again.".to_string()
        }
        _ => "请先完成日历登录，然后让我重试。".to_string(),
    }
}

/// Acknowledgement after an explicit cancel.
pub fn cancelled(language: Language) -> String {
    match language.response_language() {
        Language::En => "Okay, I've cancelled that request.".to_string(),
        _ => "好的，已取消这个请求。".to_string(),
    }
}

/// Reply when a transcript arrives for a finished dialogue.
pub fn session_finished(language: Language) -> String {
    match language.response_language() {
        Language::En => {
            "This conversation has ended. Please start a new one to book another event."
                .to_string()
        }
        _ => "本次对话已结束。要预订新的日程，请重新开始对话。".to_string(),
    }
}
