use super::fields::{ActionFields, FieldList};
use super::ActionBase;
use crate::types::NullMode;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NullAction {
    #[serde(flatten)]
    pub base: ActionBase,
    pub mode: NullMode,
}

impl NullAction {
    pub fn new(player: impl Into<String>, mode: NullMode) -> Self {
        Self {
            base: ActionBase::new(player),
            mode,
        }
    }
}

impl ActionFields for NullAction {
    fn precondition_fields<'a>(&'a self, out: &mut FieldList<'a>) {
        self.base.precondition_fields(out);
        out.text("mode", self.mode.as_str());
    }
}

/// Buy an unowned private company from the bank at face value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuyPrivateAction {
    #[serde(flatten)]
    pub base: ActionBase,
    pub private_id: String,
    pub price: i64,
}

impl BuyPrivateAction {
    pub fn new(player: impl Into<String>, private_id: impl Into<String>, price: i64) -> Self {
        Self {
            base: ActionBase::new(player),
            private_id: private_id.into(),
            price,
        }
    }
}

impl ActionFields for BuyPrivateAction {
    fn precondition_fields<'a>(&'a self, out: &mut FieldList<'a>) {
        self.base.precondition_fields(out);
        out.text("private_id", &self.private_id);
        out.int("price", self.price);
    }
}

/// Float a company. The engine offers the par range, the player commits a
/// par price inside it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartCompanyAction {
    #[serde(flatten)]
    pub base: ActionBase,
    pub company: String,
    pub min_par: i64,
    pub max_par: i64,
    #[serde(default)]
    pub par_price: Option<i64>,
}

impl StartCompanyAction {
    pub fn template(
        player: impl Into<String>,
        company: impl Into<String>,
        min_par: i64,
        max_par: i64,
    ) -> Self {
        Self {
            base: ActionBase::new(player),
            company: company.into(),
            min_par,
            max_par,
            par_price: None,
        }
    }

    pub fn with_par(mut self, par_price: i64) -> Self {
        self.par_price = Some(par_price);
        self
    }
}

impl ActionFields for StartCompanyAction {
    fn precondition_fields<'a>(&'a self, out: &mut FieldList<'a>) {
        self.base.precondition_fields(out);
        out.text("company", &self.company);
        out.int("min_par", self.min_par);
        out.int("max_par", self.max_par);
    }

    fn postcondition_fields<'a>(&'a self, out: &mut FieldList<'a>) {
        self.base.postcondition_fields(out);
        out.push("par_price", self.par_price.into());
    }
}
