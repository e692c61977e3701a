//! Voucher availability rules
//!
//! Rules run in a fixed order. The first rule a customer breaks decides the
//! message shown to them.

use shared::models::{Customer, Voucher, VoucherApplication, VoucherUsage};

/// What a rule needs to know besides the voucher itself
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    pub voucher: &'a Voucher,
    pub customer: Option<&'a Customer>,
    pub has_children: bool,
    /// Order statuses whose applications don't count as usage
    pub ignored_order_statuses: &'a [String],
}

impl RuleContext<'_> {
    fn counted_applications(&self) -> impl Iterator<Item = &VoucherApplication> {
        self.voucher
            .applications
            .iter()
            .filter(|a| !self.ignored_order_statuses.contains(&a.order_status))
    }

    fn authenticated_customer(&self) -> Option<&Customer> {
        self.customer.filter(|c| c.is_authenticated)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoucherRule {
    /// Parent vouchers can not be used directly
    HasChildren,
    Suspended,
    LimitUsageByGroup,
    SingleUse,
    SingleUsePerCustomer,
}

impl VoucherRule {
    /// Every rule, in evaluation order
    pub const ALL: [VoucherRule; 5] = [
        VoucherRule::HasChildren,
        VoucherRule::Suspended,
        VoucherRule::LimitUsageByGroup,
        VoucherRule::SingleUse,
        VoucherRule::SingleUsePerCustomer,
    ];

    pub fn is_obeyed(&self, ctx: &RuleContext<'_>) -> bool {
        let voucher = ctx.voucher;
        match self {
            VoucherRule::HasChildren => !ctx.has_children,
            VoucherRule::Suspended => !voucher.is_suspended,
            VoucherRule::LimitUsageByGroup => {
                if !voucher.limit_usage_by_group {
                    return true;
                }
                ctx.customer
                    .is_some_and(|c| c.is_member_of_any(&voucher.group_ids))
            }
            VoucherRule::SingleUse => {
                voucher.usage != VoucherUsage::SingleUse
                    || ctx.counted_applications().next().is_none()
            }
            VoucherRule::SingleUsePerCustomer => {
                if voucher.usage != VoucherUsage::OncePerCustomer {
                    return true;
                }
                match ctx.authenticated_customer() {
                    Some(customer) => !ctx
                        .counted_applications()
                        .any(|a| a.user_id.is_some() && a.user_id == customer.id),
                    None => false,
                }
            }
        }
    }

    fn message_template(&self, ctx: &RuleContext<'_>) -> &'static str {
        match self {
            VoucherRule::HasChildren => "This voucher is not available",
            VoucherRule::Suspended => "This voucher is currently inactive",
            VoucherRule::LimitUsageByGroup => "This voucher is only available to selected users",
            VoucherRule::SingleUse => "This voucher has already been used",
            VoucherRule::SingleUsePerCustomer => {
                if ctx.authenticated_customer().is_some() {
                    "You have already used this voucher in a previous order"
                } else {
                    "This voucher is only available to signed in users"
                }
            }
        }
    }

    /// Customer-facing message, empty when the rule is obeyed
    pub fn message(&self, ctx: &RuleContext<'_>) -> String {
        if self.is_obeyed(ctx) {
            String::new()
        } else {
            self.message_template(ctx).to_string()
        }
    }

    pub fn description(&self, voucher: &Voucher) -> String {
        let name = &voucher.name;
        match self {
            VoucherRule::HasChildren => format!("Check if the voucher {} has children", name),
            VoucherRule::Suspended => format!("Check if the voucher {} is suspended", name),
            VoucherRule::LimitUsageByGroup => format!(
                "Check if limit_usage_by_group is set for the voucher {} and user is not in one of the selected groups",
                name
            ),
            VoucherRule::SingleUse => format!(
                "Check if the voucher {} is single use and has already been used",
                name
            ),
            VoucherRule::SingleUsePerCustomer => format!(
                "Check if the voucher {} is single use per customer and customer has already used it",
                name
            ),
        }
    }

    /// "description: message"
    pub fn summary(&self, ctx: &RuleContext<'_>) -> String {
        format!("{}: {}", self.description(ctx.voucher), self.message(ctx))
    }
}

/// Run every rule in order, returning the first failure's message
pub fn check_rules(ctx: &RuleContext<'_>) -> (bool, String) {
    for rule in VoucherRule::ALL {
        if !rule.is_obeyed(ctx) {
            tracing::debug!(
                voucher_id = ctx.voucher.id,
                rule = ?rule,
                "Voucher rule not obeyed"
            );
            return (false, rule.message(ctx));
        }
    }
    (true, String::new())
}
