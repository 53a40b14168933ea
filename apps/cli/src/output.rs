//! Plain-text rendering for terminal output.

use std::fmt::Write as _;

use shoebox_core::{BarcodeAutofill, BarcodeRecord, ImportResult, InventoryItem, InventoryStats};

const RULE: &str = "==================================================";

/// Rows shown after an import before the remainder is summarised.
pub const IMPORT_ERRORS_SHOWN: usize = 5;

pub fn status_label(item: &InventoryItem) -> &'static str {
    if item.is_sold() {
        "판매됨"
    } else {
        "재고"
    }
}

/// Short confirmation block printed after add / update / sell.
pub fn item_summary(item: &InventoryItem) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "ID: {}", item.id);
    let _ = writeln!(out, "이름: {}", item.name);
    let _ = writeln!(out, "모델: {}", item.model_name);
    let _ = writeln!(out, "위치: {}", item.location);
    let _ = writeln!(out, "가격: {}", item.price().format_won());
    out
}

pub fn item_detail(item: &InventoryItem) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "재고 항목 상세 정보 (ID: {})", item.id);
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "위치: {}", item.location);
    let _ = writeln!(out, "구매일: {}", item.purchase_date);
    let _ = writeln!(
        out,
        "판매일: {}",
        item.sale_date.map_or_else(|| "미판매".to_string(), |d| d.to_string())
    );
    let _ = writeln!(out, "모델명: {}", item.model_name);
    let _ = writeln!(out, "이름: {}", item.name);
    let _ = writeln!(out, "사이즈: {}", item.size.as_deref().unwrap_or("미지정"));
    let _ = writeln!(out, "바코드: {}", item.barcode.as_deref().unwrap_or("없음"));
    let _ = writeln!(out, "구매처: {}", item.vendor);
    let _ = writeln!(out, "가격: {}", item.price().format_won());
    let _ = writeln!(out, "상태: {}", status_label(item));
    let _ = writeln!(out, "메모: {}", item.notes.as_deref().unwrap_or("없음"));
    let _ = writeln!(out, "생성일시: {}", item.created_at.format("%Y-%m-%d %H:%M:%S"));
    let _ = writeln!(out, "수정일시: {}", item.updated_at.format("%Y-%m-%d %H:%M:%S"));
    out
}

/// Grid table of items, one row each.
pub fn item_table(items: &[InventoryItem]) -> String {
    let headers = [
        "ID", "위치", "구매일", "판매일", "모델명", "이름", "사이즈", "바코드", "구매처", "가격",
        "상태",
    ];

    let rows: Vec<[String; 11]> = items
        .iter()
        .map(|item| {
            [
                item.id.clone(),
                item.location.clone(),
                item.purchase_date.to_string(),
                item.sale_date.map(|d| d.to_string()).unwrap_or_default(),
                item.model_name.clone(),
                item.name.clone(),
                item.size.clone().unwrap_or_default(),
                item.barcode.clone().unwrap_or_default(),
                item.vendor.clone(),
                item.price().format_won(),
                status_label(item).to_string(),
            ]
        })
        .collect();

    let mut widths = headers.map(display_width);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(display_width(cell));
        }
    }

    let border = {
        let mut line = String::from("+");
        for width in &widths {
            line.push_str(&"-".repeat(width + 2));
            line.push('+');
        }
        line
    };

    let mut out = String::new();
    let _ = writeln!(out, "{border}");
    push_row(&mut out, headers.iter().copied(), &widths);
    let _ = writeln!(out, "{}", border.replace('-', "="));
    for row in &rows {
        push_row(&mut out, row.iter().map(String::as_str), &widths);
        let _ = writeln!(out, "{border}");
    }
    out
}

fn push_row<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>, widths: &[usize]) {
    out.push('|');
    for (cell, width) in cells.zip(widths) {
        let pad = width - display_width(cell);
        let _ = write!(out, " {}{} |", cell, " ".repeat(pad));
    }
    out.push('\n');
}

/// Terminal column width: Hangul and other wide characters take two cells.
fn display_width(text: &str) -> usize {
    text.chars()
        .map(|c| match c as u32 {
            0x1100..=0x115F | 0x2E80..=0xA4CF | 0xAC00..=0xD7A3 | 0xF900..=0xFAFF
            | 0xFE30..=0xFE4F | 0xFF00..=0xFF60 | 0xFFE0..=0xFFE6 => 2,
            _ => 1,
        })
        .sum()
}

pub fn barcode_record(record: &BarcodeRecord) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "바코드: {}", record.barcode);
    let _ = writeln!(out, "모델명: {}", record.model_name);
    let _ = writeln!(out, "제품명: {}", record.name);
    let _ = writeln!(out, "생성일: {}", record.created_at.format("%Y-%m-%d %H:%M:%S"));
    let _ = writeln!(out, "수정일: {}", record.updated_at.format("%Y-%m-%d %H:%M:%S"));
    out
}

pub fn autofill(fill: &BarcodeAutofill) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "모델명: {}", fill.model_name);
    let _ = writeln!(out, "제품명: {}", fill.name);
    let _ = writeln!(out, "사이즈: {}", fill.size.as_deref().unwrap_or("미지정"));
    let _ = writeln!(out, "구매처: {}", fill.vendor);
    let _ = writeln!(out, "가격: {}", fill.price.format_won());
    out
}

pub fn import_summary(result: &ImportResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "가져오기 결과");
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "성공: {}개", result.success_count);
    let _ = writeln!(out, "실패: {}개", result.error_count);

    if result.error_count > 0 {
        if let Some(path) = &result.error_report_path {
            let _ = writeln!(out, "오류 파일: {}", path.display());
        }
        let _ = writeln!(out, "오류 상세:");
        for failure in result.errors.iter().take(IMPORT_ERRORS_SHOWN) {
            let _ = writeln!(out, "  행 {}: {}", failure.row_number, failure.message);
        }
        if result.errors.len() > IMPORT_ERRORS_SHOWN {
            let _ = writeln!(
                out,
                "  ... 및 {}개 추가 오류",
                result.errors.len() - IMPORT_ERRORS_SHOWN
            );
        }
    }
    out
}

pub fn stats(stats: &InventoryStats, vendors: &[String], locations: &[String]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "재고 통계");
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "전체 항목: {}개", stats.total_items);
    let _ = writeln!(out, "재고 항목: {}개", stats.in_stock_items);
    let _ = writeln!(out, "판매된 항목: {}개", stats.sold_items);
    let _ = writeln!(out, "총 재고 가치: {}", stats.in_stock_value.format_won());
    let _ = writeln!(out, "평균 가격: {}", stats.average_price.format_won());
    let _ = writeln!(out, "최고 가격: {}", stats.max_price.format_won());
    let _ = writeln!(out, "최저 가격: {}", stats.min_price.format_won());

    for (title, values) in [("구매처 목록", vendors), ("위치 목록", locations)] {
        let _ = writeln!(out);
        let _ = writeln!(out, "{RULE}");
        let _ = writeln!(out, "{title}");
        let _ = writeln!(out, "{RULE}");
        for value in values {
            let _ = writeln!(out, "• {value}");
        }
    }
    out
}
