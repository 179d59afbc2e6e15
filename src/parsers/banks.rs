//! Delimited export layouts, one per bank.
//!
//! Each bank only declares the header substrings that identify its export and
//! the aliases of each logical column; the walking itself lives in
//! [`super::delimited`].

use super::delimited::{DelimitedParser, Layout};
use crate::models::Field;

// ---------------------------------------------------------------------------
// HDFC Bank (delimited netbanking export)
// Date,Narration,Chq./Ref.No.,Value Dt,Withdrawal Amt.,Deposit Amt.,Closing Balance
// ---------------------------------------------------------------------------

pub static HDFC: DelimitedParser = DelimitedParser {
    key: "hdfc",
    name: "HDFC Bank",
    name_tokens: &["hdfc"],
    layout: Layout {
        required_headers: &["narration", "chq./ref.no.", "value dt", "withdrawal amt", "deposit amt"],
        aliases: &[
            (Field::Date, &["date"]),
            (Field::Narration, &["narration"]),
            (Field::RefNo, &["chq./ref.no."]),
            (Field::ValueDate, &["value dt"]),
            (Field::Withdrawal, &["withdrawal amt"]),
            (Field::Deposit, &["deposit amt"]),
            (Field::ClosingBalance, &["closing balance"]),
        ],
    },
};

// ---------------------------------------------------------------------------
// ICICI Bank
// S No.,Value Date,Transaction Date,Cheque Number,Transaction Remarks,
// Withdrawal Amount (INR ),Deposit Amount (INR ),Balance (INR )
// ---------------------------------------------------------------------------

pub static ICICI: DelimitedParser = DelimitedParser {
    key: "icici",
    name: "ICICI Bank",
    name_tokens: &["icici"],
    layout: Layout {
        required_headers: &["transaction remarks", "withdrawal amount", "deposit amount"],
        aliases: &[
            (Field::Date, &["transaction date"]),
            (Field::ValueDate, &["value date"]),
            (Field::Narration, &["transaction remarks"]),
            (Field::RefNo, &["cheque number"]),
            (Field::Withdrawal, &["withdrawal amount"]),
            (Field::Deposit, &["deposit amount"]),
            (Field::ClosingBalance, &["balance"]),
        ],
    },
};

// ---------------------------------------------------------------------------
// State Bank of India (dates as "1 Jan 2024")
// Txn Date,Value Date,Description,Ref No./Cheque No.,Debit,Credit,Balance
// ---------------------------------------------------------------------------

pub static SBI: DelimitedParser = DelimitedParser {
    key: "sbi",
    name: "State Bank of India",
    name_tokens: &["state bank of india", "sbi"],
    layout: Layout {
        required_headers: &["txn date", "description", "ref no./cheque no.", "debit", "credit"],
        aliases: &[
            (Field::Date, &["txn date"]),
            (Field::ValueDate, &["value date"]),
            (Field::Narration, &["description"]),
            (Field::RefNo, &["ref no"]),
            (Field::Withdrawal, &["debit"]),
            (Field::Deposit, &["credit"]),
            (Field::ClosingBalance, &["balance"]),
        ],
    },
};

// ---------------------------------------------------------------------------
// Axis Bank
// Tran Date,CHQNO,PARTICULARS,DR,CR,BAL,SOL
// ---------------------------------------------------------------------------

pub static AXIS: DelimitedParser = DelimitedParser {
    key: "axis",
    name: "Axis Bank",
    name_tokens: &["axis bank", "axis"],
    layout: Layout {
        required_headers: &["tran date", "chqno", "particulars", "dr", "cr", "bal"],
        aliases: &[
            (Field::Date, &["tran date"]),
            (Field::RefNo, &["chqno"]),
            (Field::Narration, &["particulars"]),
            (Field::Withdrawal, &["dr"]),
            (Field::Deposit, &["cr"]),
            (Field::ClosingBalance, &["bal"]),
        ],
    },
};

// ---------------------------------------------------------------------------
// Kotak Mahindra Bank (single amount + Dr/Cr indicator)
// Sl. No.,Date,Description,Chq / Ref No.,Amount,Dr / Cr,Balance,Dr / Cr
// ---------------------------------------------------------------------------

pub static KOTAK: DelimitedParser = DelimitedParser {
    key: "kotak",
    name: "Kotak Mahindra Bank",
    name_tokens: &["kotak"],
    layout: Layout {
        required_headers: &["description", "chq / ref no", "amount", "dr / cr"],
        aliases: &[
            (Field::Date, &["date"]),
            (Field::Narration, &["description"]),
            (Field::RefNo, &["chq / ref"]),
            (Field::Amount, &["amount"]),
            (Field::Indicator, &["dr / cr"]),
            (Field::ClosingBalance, &["balance"]),
        ],
    },
};

// ---------------------------------------------------------------------------
// Yes Bank
// Transaction Date,Value Date,Description,Reference No,Withdrawals,Deposits,Running Balance
// ---------------------------------------------------------------------------

pub static YES: DelimitedParser = DelimitedParser {
    key: "yes",
    name: "Yes Bank",
    name_tokens: &["yes bank", "yesbank"],
    layout: Layout {
        required_headers: &["transaction date", "reference no", "withdrawals", "deposits", "running balance"],
        aliases: &[
            (Field::Date, &["transaction date"]),
            (Field::ValueDate, &["value date"]),
            (Field::Narration, &["description"]),
            (Field::RefNo, &["reference no"]),
            (Field::Withdrawal, &["withdrawals"]),
            (Field::Deposit, &["deposits"]),
            (Field::ClosingBalance, &["running balance"]),
        ],
    },
};

// ---------------------------------------------------------------------------
// IDFC First Bank (dates as "05 Jan 2024")
// Transaction Date,Value Date,Particulars,Cheque No.,Debit,Credit,Balance
// ---------------------------------------------------------------------------

pub static IDFC_FIRST: DelimitedParser = DelimitedParser {
    key: "idfc_first",
    name: "IDFC First Bank",
    name_tokens: &["idfc"],
    layout: Layout {
        required_headers: &["transaction date", "particulars", "cheque no", "debit", "credit"],
        aliases: &[
            (Field::Date, &["transaction date"]),
            (Field::ValueDate, &["value date"]),
            (Field::Narration, &["particulars"]),
            (Field::RefNo, &["cheque no"]),
            (Field::Withdrawal, &["debit"]),
            (Field::Deposit, &["credit"]),
            (Field::ClosingBalance, &["balance"]),
        ],
    },
};

// ---------------------------------------------------------------------------
// IndusInd Bank ("Withdrawl" is the bank's spelling)
// Date,Particulars,Chq./Ref. No,Withdrawl,Deposit,Balance
// ---------------------------------------------------------------------------

pub static INDUSIND: DelimitedParser = DelimitedParser {
    key: "indusind",
    name: "IndusInd Bank",
    name_tokens: &["indusind"],
    layout: Layout {
        required_headers: &["particulars", "chq./ref. no", "withdrawl", "deposit"],
        aliases: &[
            (Field::Date, &["date"]),
            (Field::Narration, &["particulars"]),
            (Field::RefNo, &["chq./ref. no"]),
            (Field::Withdrawal, &["withdrawl"]),
            (Field::Deposit, &["deposit"]),
            (Field::ClosingBalance, &["balance"]),
        ],
    },
};

// ---------------------------------------------------------------------------
// Federal Bank
// Date,Value Date,Particulars,Tran Type,Cheque Details,Withdrawals,Deposits,Balance,DR/CR
// ---------------------------------------------------------------------------

pub static FEDERAL: DelimitedParser = DelimitedParser {
    key: "federal",
    name: "Federal Bank",
    name_tokens: &["federal bank", "federal"],
    layout: Layout {
        required_headers: &["particulars", "tran type", "cheque details", "withdrawals", "deposits"],
        aliases: &[
            (Field::Date, &["date"]),
            (Field::ValueDate, &["value date"]),
            (Field::Narration, &["particulars"]),
            (Field::RefNo, &["cheque details"]),
            (Field::Withdrawal, &["withdrawals"]),
            (Field::Deposit, &["deposits"]),
            (Field::ClosingBalance, &["balance"]),
        ],
    },
};

// ---------------------------------------------------------------------------
// Bank of Baroda
// TRAN DATE,VALUE DATE,NARRATION,CHQ.NO.,WITHDRAWAL(DR),DEPOSIT(CR),BALANCE(INR)
// ---------------------------------------------------------------------------

pub static BANK_OF_BARODA: DelimitedParser = DelimitedParser {
    key: "bank_of_baroda",
    name: "Bank of Baroda",
    name_tokens: &["bank of baroda", "baroda"],
    layout: Layout {
        required_headers: &["tran date", "narration", "chq.no.", "withdrawal(dr)", "deposit(cr)"],
        aliases: &[
            (Field::Date, &["tran date"]),
            (Field::ValueDate, &["value date"]),
            (Field::Narration, &["narration"]),
            (Field::RefNo, &["chq.no."]),
            (Field::Withdrawal, &["withdrawal"]),
            (Field::Deposit, &["deposit"]),
            (Field::ClosingBalance, &["balance"]),
        ],
    },
};

// ---------------------------------------------------------------------------
// Canara Bank
// Txn Date,Value Date,Cheque No.,Description,Branch Code,Debit,Credit,Balance
// ---------------------------------------------------------------------------

pub static CANARA: DelimitedParser = DelimitedParser {
    key: "canara",
    name: "Canara Bank",
    name_tokens: &["canara"],
    layout: Layout {
        required_headers: &["txn date", "cheque no", "description", "branch code", "debit", "credit"],
        aliases: &[
            (Field::Date, &["txn date"]),
            (Field::ValueDate, &["value date"]),
            (Field::RefNo, &["cheque no"]),
            (Field::Narration, &["description"]),
            (Field::Withdrawal, &["debit"]),
            (Field::Deposit, &["credit"]),
            (Field::ClosingBalance, &["balance"]),
        ],
    },
};

// ---------------------------------------------------------------------------
// Punjab National Bank
// Txn No.,Txn Date,Description,Branch Name,Cheque No.,Dr Amount,Cr Amount,Balance
// ---------------------------------------------------------------------------

pub static PNB: DelimitedParser = DelimitedParser {
    key: "pnb",
    name: "Punjab National Bank",
    name_tokens: &["punjab national bank", "pnb"],
    layout: Layout {
        required_headers: &["txn no", "txn date", "branch name", "dr amount", "cr amount"],
        aliases: &[
            (Field::Date, &["txn date"]),
            (Field::Narration, &["description"]),
            (Field::RefNo, &["cheque no"]),
            (Field::Withdrawal, &["dr amount"]),
            (Field::Deposit, &["cr amount"]),
            (Field::ClosingBalance, &["balance"]),
        ],
    },
};

// ---------------------------------------------------------------------------
// AU Small Finance Bank (single amount + C/D indicator)
// Transaction Date,Value Date,Description,Ref/Cheque No.,Amount,Cr/Dr,Balance
// ---------------------------------------------------------------------------

pub static AU_SMALL_FINANCE: DelimitedParser = DelimitedParser {
    key: "au_small_finance",
    name: "AU Small Finance Bank",
    name_tokens: &["au small finance", "aubank", "au bank"],
    layout: Layout {
        required_headers: &["transaction date", "description", "ref/cheque no", "amount", "cr/dr"],
        aliases: &[
            (Field::Date, &["transaction date"]),
            (Field::ValueDate, &["value date"]),
            (Field::Narration, &["description"]),
            (Field::RefNo, &["ref/cheque"]),
            (Field::Amount, &["amount"]),
            (Field::Indicator, &["cr/dr"]),
            (Field::ClosingBalance, &["balance"]),
        ],
    },
};
