//! Field names as they appear in source records and chunk `fields`.

pub const ACCOUNT_ID: &str = "accountId";
pub const ACCOUNT_STATUS: &str = "accountStatus";
pub const ACCOUNT_TYPE: &str = "accountType";
pub const AMOUNT: &str = "amount";
pub const APR: &str = "apr";
pub const AUTH_DATE_TIME: &str = "authDateTime";
pub const AVAILABLE_CREDIT: &str = "availableCredit";
pub const CATEGORY: &str = "category";
pub const CLOSING_DATE_TIME: &str = "closingDateTime";
pub const CREDIT_LIMIT: &str = "creditLimit";
pub const CURRENT_BALANCE: &str = "currentBalance";
pub const DEBIT_CREDIT_INDICATOR: &str = "debitCreditIndicator";
pub const DESCRIPTION: &str = "description";
pub const DISPLAY_TRANSACTION_TYPE: &str = "displayTransactionType";
pub const DUE_DATE: &str = "dueDate";
pub const ENDING_BALANCE: &str = "endingBalance";
pub const INTEREST_CHARGED: &str = "interestCharged";
pub const INTEREST_FLAG: &str = "interestFlag";
pub const MERCHANT_NAME: &str = "merchantName";
pub const METRIC: &str = "metric";
pub const MINIMUM_AMOUNT_DUE: &str = "minimumAmountDue";
pub const OPENING_DATE_TIME: &str = "openingDateTime";
pub const OPEN_DATE: &str = "openDate";
pub const OUTSTANDING_BALANCE: &str = "outstandingBalance";
pub const PAGE: &str = "page";
pub const PAYMENT_DATE_TIME: &str = "paymentDateTime";
pub const PAYMENT_ID: &str = "paymentId";
pub const PERIOD: &str = "period";
pub const POSTING_DATE_TIME: &str = "postingDateTime";
pub const PRODUCT: &str = "product";
pub const PURCHASE_APR: &str = "purchaseApr";
pub const RUNNING_BALANCE: &str = "runningBalance";
pub const SCHEDULED_PAYMENT_DATE_TIME: &str = "scheduledPaymentDateTime";
pub const SCHEDULED_PAYMENT_ID: &str = "scheduledPaymentId";
pub const SEGMENT: &str = "segment";
pub const STATEMENT_ID: &str = "statementId";
pub const STATUS: &str = "status";
pub const TEXT: &str = "text";
pub const TOTAL_AMOUNT_DUE: &str = "totalAmountDue";
pub const TRANSACTION_DATE_TIME: &str = "transactionDateTime";
pub const TRANSACTION_ID: &str = "transactionId";
pub const TRANSACTION_TYPE: &str = "transactionType";
pub const VALUE: &str = "value";
