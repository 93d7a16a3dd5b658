/// UI層との境界
///
/// コントローラーは特定のUIツールキットに依存せず、ここで定義するトレイト経由で
/// 画面遷移・モーダル表示・アラート表示を行う。
use std::collections::HashMap;

/// 領収書URLを保持する属性名
pub const BILL_URL_ATTRIBUTE: &str = "data-bill-url";

/// 画面遷移
pub trait Navigator: Send + Sync {
    fn navigate(&self, pathname: &str);
}

/// ユーザー向けアラート表示
pub trait Alerter: Send + Sync {
    fn alert(&self, message: &str);
}

/// モーダル表示
pub trait ModalPresenter: Send + Sync {
    /// モーダルの現在の幅（ピクセル）
    fn width(&self) -> u32;

    fn show(&self, content: ModalContent);
}

/// モーダルに表示する内容
#[derive(Debug, Clone, PartialEq)]
pub enum ModalContent {
    ReceiptPreview(ReceiptPreview),
}

/// 領収書画像のプレビュー
#[derive(Debug, Clone, PartialEq)]
pub struct ReceiptPreview {
    pub image_url: String,
    pub width: u32,
}

impl ReceiptPreview {
    /// モーダル幅の半分で表示する
    pub fn for_modal_width<S: Into<String>>(image_url: S, modal_width: u32) -> Self {
        Self {
            image_url: image_url.into(),
            width: modal_width / 2,
        }
    }

    /// モーダル本体のHTML
    pub fn to_html(&self) -> String {
        format!(
            "<div style='text-align: center;' class=\"bill-proof-container\"><img width={} src={} alt=\"Bill\" data-testid=\"modal-img\"/></div>",
            self.width,
            escape_attribute(&self.image_url)
        )
    }
}

fn escape_attribute(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace(' ', "%20")
}

/// プレビュー操作の起点となるUI要素（目のアイコン）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReceiptRef {
    attributes: HashMap<String, String>,
}

impl ReceiptRef {
    pub fn new() -> Self {
        Self::default()
    }

    /// 領収書URLを持つ要素を作成する
    pub fn with_bill_url<S: Into<String>>(url: S) -> Self {
        Self::new().with_attribute(BILL_URL_ATTRIBUTE, url)
    }

    pub fn with_attribute<K: Into<String>, V: Into<String>>(mut self, name: K, value: V) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn bill_url(&self) -> Option<&str> {
        self.attribute(BILL_URL_ATTRIBUTE)
            .filter(|url| !url.trim().is_empty())
    }
}
