use serde::{Deserialize, Serialize};

use super::{FineError, FineId, Money, UserId};

/// 罰金
///
/// 部分支払いで金額が減り、0になった時点で支払済みになる。
/// 金額は負にならない。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fine {
    pub fine_id: FineId,
    pub user_id: UserId,
    pub amount: Money,
    pub paid: bool,
}

impl Fine {
    /// 新しい未払い罰金を作成する
    ///
    /// # エラー
    /// 金額が0以下の場合は`FineError::NonPositiveAmount`
    pub fn issue(user_id: UserId, amount: Money) -> Result<Self, FineError> {
        if !amount.is_positive() {
            return Err(FineError::NonPositiveAmount);
        }
        Ok(Self {
            fine_id: FineId::new(),
            user_id,
            amount,
            paid: false,
        })
    }

    /// 支払いを適用し、(更新後の罰金, 使われなかった残額) を返す
    pub fn apply_payment(self, payment: Money) -> (Fine, Money) {
        if self.paid || !payment.is_positive() {
            return (self, payment);
        }

        let applied = payment.min(self.amount);
        let amount = self.amount.saturating_sub(applied);
        let remaining = payment.saturating_sub(applied);

        let fine = Fine {
            amount,
            paid: amount == Money::ZERO,
            ..self
        };
        (fine, remaining)
    }
}

/// 支払い配分の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentAllocation {
    /// 支払いで変更された罰金（元の順序）
    pub updated: Vec<Fine>,
    /// 罰金に充当された額
    pub applied: Money,
    /// 充当しきれなかった額
    pub change: Money,
}

/// 純粋関数：支払いを未払い罰金へ配分する
///
/// ビジネスルール：
/// - 渡された順序（作成順）に充当する。並べ替えはしない
/// - 各罰金を全額支払ってから次へ進み、端数は次の罰金に部分充当する
/// - 支払済みの罰金は対象外
pub fn allocate_payment(unpaid: Vec<Fine>, payment: Money) -> PaymentAllocation {
    let mut remaining = payment;
    let mut updated = Vec::new();

    for fine in unpaid {
        if !remaining.is_positive() {
            break;
        }
        if fine.paid {
            continue;
        }
        let (fine, rest) = fine.apply_payment(remaining);
        remaining = rest;
        updated.push(fine);
    }

    PaymentAllocation {
        updated,
        applied: payment.saturating_sub(remaining),
        change: remaining,
    }
}
