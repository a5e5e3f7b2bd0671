use crate::domain::{ItemRef, LibraryItem};
use async_trait::async_trait;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 資料カタログポート
///
/// 貸出コンテキストは資料の参照（種別 + 識別子）と貸出可否のみを扱う。
#[async_trait]
pub trait ItemCatalog: Send + Sync {
    /// 参照から資料を取得する
    async fn get(&self, item: &ItemRef) -> Result<Option<LibraryItem>>;

    /// 貸出可否フラグを更新する
    ///
    /// 資料が存在しない場合は`false`を返す。
    async fn set_availability(&self, item: &ItemRef, available: bool) -> Result<bool>;

    /// 貸出可能な資料を貸出中にする（確認と更新を不可分に行う）
    ///
    /// 資料が存在しない、または既に貸出中の場合は何もせず`false`を返す。
    async fn reserve(&self, item: &ItemRef) -> Result<bool>;

    /// 資料を登録する
    ///
    /// 同じ参照の資料が既にある場合は何もせず`false`を返す。
    async fn register(&self, item: &LibraryItem) -> Result<bool>;

    /// 全資料を種別・識別子順に取得する
    async fn list(&self) -> Result<Vec<LibraryItem>>;
}
