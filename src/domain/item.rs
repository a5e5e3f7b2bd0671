use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{ItemId, UnknownItemType};

/// 資料種別タグ
///
/// 貸出期間と延滞料金率はこのタグをキーに`LibraryPolicy`から引く。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemType {
    Book,
    Cd,
    Journal,
}

impl ItemType {
    pub const ALL: [ItemType; 3] = [ItemType::Book, ItemType::Cd, ItemType::Journal];

    /// 永続化・APIで使う文字列表現
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemType::Book => "BOOK",
            ItemType::Cd => "CD",
            ItemType::Journal => "JOURNAL",
        }
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemType {
    type Err = UnknownItemType;

    /// 未知のタグは書籍扱いにせず、必ずエラーにする
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BOOK" => Ok(ItemType::Book),
            "CD" => Ok(ItemType::Cd),
            "JOURNAL" => Ok(ItemType::Journal),
            _ => Err(UnknownItemType(s.to_string())),
        }
    }
}

/// 種別ごとの固有フィールド
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "item_type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemKind {
    Book { author: String },
    Cd { artist: String },
    Journal { publisher: String },
}

impl ItemKind {
    pub fn item_type(&self) -> ItemType {
        match self {
            ItemKind::Book { .. } => ItemType::Book,
            ItemKind::Cd { .. } => ItemType::Cd,
            ItemKind::Journal { .. } => ItemType::Journal,
        }
    }
}

/// 資料への参照（種別 + 識別子）
///
/// 貸出は資料そのものではなくこの参照を保持する。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemRef {
    pub item_type: ItemType,
    pub identifier: ItemId,
}

impl ItemRef {
    pub fn new(item_type: ItemType, identifier: ItemId) -> Self {
        Self {
            item_type,
            identifier,
        }
    }
}

impl fmt::Display for ItemRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.item_type, self.identifier)
    }
}

/// 図書館資料（書籍・CD・雑誌）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryItem {
    pub identifier: ItemId,
    pub title: String,
    pub available: bool,
    #[serde(flatten)]
    pub kind: ItemKind,
}

impl LibraryItem {
    /// 新しい資料は貸出可能な状態で作られる
    pub fn book(isbn: impl Into<String>, title: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            identifier: ItemId::new(isbn),
            title: title.into(),
            available: true,
            kind: ItemKind::Book {
                author: author.into(),
            },
        }
    }

    pub fn cd(
        catalog_number: impl Into<String>,
        title: impl Into<String>,
        artist: impl Into<String>,
    ) -> Self {
        Self {
            identifier: ItemId::new(catalog_number),
            title: title.into(),
            available: true,
            kind: ItemKind::Cd {
                artist: artist.into(),
            },
        }
    }

    pub fn journal(
        issn: impl Into<String>,
        title: impl Into<String>,
        publisher: impl Into<String>,
    ) -> Self {
        Self {
            identifier: ItemId::new(issn),
            title: title.into(),
            available: true,
            kind: ItemKind::Journal {
                publisher: publisher.into(),
            },
        }
    }

    pub fn item_type(&self) -> ItemType {
        self.kind.item_type()
    }

    pub fn item_ref(&self) -> ItemRef {
        ItemRef::new(self.item_type(), self.identifier.clone())
    }
}
