// 領収書ファイルの形式チェック

use once_cell::sync::Lazy;
use regex::Regex;

/// 許可する拡張子（jpg / jpeg / png、大文字小文字を区別しない）
static ALLOWED_EXTENSION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\.(jpe?g|png)$").expect("拡張子の正規表現が不正です")
});

/// 許可するContent-Type
const ALLOWED_CONTENT_TYPES: [&str; 3] = ["image/jpg", "image/jpeg", "image/png"];

/// 形式が不正な場合のアラートメッセージ
pub const INVALID_FORMAT_MESSAGE: &str =
    "Le format du fichier n'est pas valide. Veuillez sélectionner un fichier au format JPG, JPEG ou PNG.";

/// ユーザーが選択したファイル
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

impl SelectedFile {
    pub fn new<N: Into<String>, C: Into<String>>(name: N, content_type: C, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            data,
        }
    }
}

/// 拡張子とContent-Typeの両方が許可されているか
///
/// Content-Typeが空の場合は拡張子のみで判定する
pub fn is_allowed_receipt(file: &SelectedFile) -> bool {
    if !ALLOWED_EXTENSION.is_match(file.name.trim()) {
        return false;
    }

    let content_type = file.content_type.trim().to_ascii_lowercase();
    content_type.is_empty() || ALLOWED_CONTENT_TYPES.contains(&content_type.as_str())
}

/// ファイル名から送信用のContent-Typeを決める
pub fn content_type_for(file: &SelectedFile) -> String {
    let declared = file.content_type.trim().to_ascii_lowercase();
    if !declared.is_empty() && declared != "image/jpg" {
        return declared;
    }

    if file.name.to_ascii_lowercase().ends_with(".png") {
        "image/png".to_string()
    } else {
        "image/jpeg".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str, content_type: &str) -> SelectedFile {
        SelectedFile::new(name, content_type, name.as_bytes().to_vec())
    }

    #[test]
    fn test_allowed_files() {
        assert!(is_allowed_receipt(&file("facturefreemobile.jpg", "image/jpg")));
        assert!(is_allowed_receipt(&file("mock-file.jpg", "image/jpeg")));
        assert!(is_allowed_receipt(&file("scan.JPEG", "image/jpeg")));
        assert!(is_allowed_receipt(&file("capture.png", "image/png")));
        assert!(is_allowed_receipt(&file("capture.png", "")));
    }

    #[test]
    fn test_rejected_files() {
        assert!(!is_allowed_receipt(&file("facturefreemobile.pdf", "application/pdf")));
        assert!(!is_allowed_receipt(&file("image.gif", "image/gif")));
        assert!(!is_allowed_receipt(&file("jpg", "image/jpeg")));
        // 拡張子だけ偽装したファイル
        assert!(!is_allowed_receipt(&file("facture.jpg", "application/pdf")));
        assert!(!is_allowed_receipt(&file("facture.jpg.exe", "image/jpeg")));
    }

    #[test]
    fn test_content_type_for() {
        assert_eq!(content_type_for(&file("a.jpg", "image/jpg")), "image/jpeg");
        assert_eq!(content_type_for(&file("a.png", "")), "image/png");
        assert_eq!(content_type_for(&file("a.jpeg", "")), "image/jpeg");
        assert_eq!(content_type_for(&file("a.png", "image/png")), "image/png");
    }
}
