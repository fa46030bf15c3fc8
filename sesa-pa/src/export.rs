//! CSV export of the assessment history
//!
//! Output is UTF-8 with a BOM so spreadsheet applications open the
//! Japanese text correctly. Fields containing delimiters, quotes, or line
//! breaks are quoted with inner quotes doubled.

use crate::models::HistoryRecord;

const BOM: &str = "\u{FEFF}";

const HEADER: &[&str] = &[
    "記録ID",
    "記録日時",
    "学籍番号",
    "氏名",
    "クラス",
    "課題種別",
    "課題名",
    "課題文",
    "認識テキスト",
    "正確性",
    "流暢性",
    "韻律",
    "完全性",
    "総合スコア",
    "評価",
    "CEFR",
    "TOEFL換算",
    "IELTS換算",
    "発音注意単語",
    "発音注意音素",
    "フィードバック",
    "処理時間(秒)",
];

/// Render the full history as one CSV document
pub fn history_to_csv(records: &[HistoryRecord]) -> String {
    let mut out = String::new();
    out.push_str(BOM);
    push_row(&mut out, HEADER.iter().map(|s| s.to_string()));

    for record in records {
        push_row(
            &mut out,
            [
                record.id.clone(),
                record.recorded_at.to_rfc3339(),
                record.student_id.clone(),
                record.student_name.clone(),
                record.class_group.clone(),
                record.task_type.clone(),
                record.task_name.clone(),
                record.target_text.clone(),
                record.transcription.clone(),
                format!("{}", record.accuracy),
                format!("{}", record.fluency),
                format!("{}", record.prosody),
                format!("{}", record.completeness),
                format!("{}", record.total_score),
                record.band.clone(),
                record.cefr.clone(),
                record.toefl.clone(),
                record.ielts.clone(),
                record.mispronounced_words.clone(),
                record.phoneme_errors.clone(),
                record.feedback.clone(),
                format!("{:.1}", record.processing_seconds),
            ]
            .into_iter(),
        );
    }

    out
}

fn push_row(out: &mut String, fields: impl Iterator<Item = String>) {
    let mut first = true;
    for field in fields {
        if !first {
            out.push(',');
        }
        first = false;
        out.push_str(&escape_field(&field));
    }
    out.push_str("\r\n");
}

fn escape_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
