use serde::{Deserialize, Serialize};

use super::{ItemType, Money, UnknownItemType};

/// 1日あたりの延滞料金率
///
/// 種別ごとの料金計算はこの値1つで表現する（クラス階層は持たない）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FineRate {
    daily_rate: Money,
}

impl FineRate {
    pub const fn per_day(units: i64) -> Self {
        Self {
            daily_rate: Money::new(units),
        }
    }

    pub fn daily_rate(&self) -> Money {
        self.daily_rate
    }

    /// 延滞日数から罰金額を計算する
    ///
    /// 0日以下なら0、それ以外は `日数 * 日額`。
    pub fn calculate_fine(&self, overdue_days: i64) -> Money {
        if overdue_days <= 0 {
            return Money::ZERO;
        }
        Money::new(overdue_days.saturating_mul(self.daily_rate.value()))
    }
}

/// 種別ごとの貸出ルール
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRules {
    pub loan_period_days: u32,
    pub fine_rate: FineRate,
}

/// 貸出期間と延滞料金率の表
///
/// 起動時に一度作られ、以後は不変。各サービスへ明示的に渡す。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryPolicy {
    pub book: ItemRules,
    pub cd: ItemRules,
    pub journal: ItemRules,
}

/// 書籍: 28日 / 10
pub const BOOK_RULES: ItemRules = ItemRules {
    loan_period_days: 28,
    fine_rate: FineRate::per_day(10),
};

/// CD: 7日 / 20
pub const CD_RULES: ItemRules = ItemRules {
    loan_period_days: 7,
    fine_rate: FineRate::per_day(20),
};

/// 雑誌: 14日 / 15
pub const JOURNAL_RULES: ItemRules = ItemRules {
    loan_period_days: 14,
    fine_rate: FineRate::per_day(15),
};

impl Default for LibraryPolicy {
    fn default() -> Self {
        Self {
            book: BOOK_RULES,
            cd: CD_RULES,
            journal: JOURNAL_RULES,
        }
    }
}

impl LibraryPolicy {
    pub fn rules(&self, item_type: ItemType) -> &ItemRules {
        match item_type {
            ItemType::Book => &self.book,
            ItemType::Cd => &self.cd,
            ItemType::Journal => &self.journal,
        }
    }

    pub fn loan_period_days(&self, item_type: ItemType) -> u32 {
        self.rules(item_type).loan_period_days
    }

    pub fn fine_rate(&self, item_type: ItemType) -> FineRate {
        self.rules(item_type).fine_rate
    }

    /// 種別タグ文字列から料金率を引く
    ///
    /// # エラー
    /// 未知のタグは`UnknownItemType`（書籍へのフォールバックはしない）
    pub fn fine_rate_for_tag(&self, tag: &str) -> Result<FineRate, UnknownItemType> {
        let item_type = tag.parse::<ItemType>()?;
        Ok(self.fine_rate(item_type))
    }
}
