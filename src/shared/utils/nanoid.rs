use nanoid::nanoid;

/// 識別子に使う文字セット（英数字のみ）
const ID_ALPHABET: [char; 62] = [
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i',
    'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z', 'A', 'B',
    'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O', 'P', 'Q', 'R', 'S', 'T', 'U',
    'V', 'W', 'X', 'Y', 'Z',
];

/// 識別子の長さ
pub const BILL_ID_LENGTH: usize = 20;

/// 経費ノート（bill）用の識別子を生成する
///
/// # 戻り値
/// 20文字の英数字ID（例: `47qAXb6fIm2zOKkLzMro`）
pub fn generate_bill_id() -> String {
    nanoid!(BILL_ID_LENGTH, &ID_ALPHABET)
}
