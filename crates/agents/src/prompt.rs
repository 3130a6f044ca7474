//! Prompt text sent to the language model.

use {tutorbot_common::types::StudentRecord, tutorbot_students::TeacherNote};

/// Reply the model gives when no listed student is named.
pub const NO_STUDENT_MARKER: &str = "無";

/// Single-student summary with short advice.
pub fn student_summary(record: &StudentRecord) -> String {
    format!(
        "請根據以下學生資料，簡單分析其學習與生活狀況，並給出簡短建議：\n\n{}",
        record.to_lines()
    )
}

/// Ask the model which of `names` the message talks about.
pub fn identify_student(text: &str, names: &[String]) -> String {
    format!(
        "以下是班上所有學生的姓名：\n{}\n\n\
         請判斷這則訊息是在詢問哪一位學生，只回覆該學生的姓名；\
         若沒有提到任何學生，請只回覆「{NO_STUDENT_MARKER}」。\n\n訊息：{text}",
        names.join("、")
    )
}

/// Open question over score rows and teacher notes.
///
/// When `subject` is set the model is told which student the question is
/// about, so follow-ups that do not restate the name still resolve.
pub fn analyze_question(
    question: &str,
    subject: Option<&str>,
    records: &[StudentRecord],
    notes: &[TeacherNote],
) -> String {
    let mut prompt = String::from("你是一位協助導師的 AI 助教，請根據下列資料回答問題。\n\n");

    prompt.push_str("【成績與出缺勤資料】\n");
    if records.is_empty() {
        prompt.push_str("（無資料）\n");
    }
    for record in records {
        prompt.push_str(&record.to_lines());
        prompt.push_str("\n---\n");
    }

    prompt.push_str("\n【導師紀錄】\n");
    if notes.is_empty() {
        prompt.push_str("（無紀錄）\n");
    }
    for note in notes {
        prompt.push_str(&format!(
            "{} {}：{}\n",
            note.date.format("%Y-%m-%d"),
            note.student_name,
            note.text
        ));
    }

    if let Some(subject) = subject {
        prompt.push_str(&format!("\n若問題未指明學生，預設是在詢問「{subject}」。\n"));
    }
    prompt.push_str(&format!("\n問題：{question}"));
    prompt
}
