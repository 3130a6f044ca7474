//! Fixed reply texts.

pub const LOGOUT_CONFIRMATION: &str = "已登出，如需再次查詢請重新輸入「學號 姓名」。";

pub const LOGIN_PROMPT: &str =
    "請先輸入「學號 姓名」完成身分綁定，兩者以空白分隔，例如：A001 吳志強";

pub fn login_success(name: &str) -> String {
    format!("✅ 綁定成功！您現在可以查詢 {name} 的學習狀況。")
}

pub fn access_denied(name: &str) -> String {
    format!("⚠️ 您只能查詢 {name} 的資料，請在問題中提到 {name}。")
}

pub fn no_record_for(name: &str) -> String {
    format!("查無 {name} 的資料，請確認姓名是否正確。")
}
