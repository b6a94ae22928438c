use log::warn;

use crate::Message;
use crate::parse::parse_message;

struct DemoMail {
    id: &'static str,
    reply_to: Option<&'static str>,
    references: &'static str,
    from: &'static str,
    subject: &'static str,
    date: &'static str,
    body: &'static str,
    attachment: Option<&'static str>,
    unread: bool,
}

const TO: &str = "Ratmail Demo <personal@ratmail-demo.local>";

const DEMO: &[DemoMail] = &[
    DemoMail {
        id: "ns-20419@northstar-outfitters.com",
        reply_to: None,
        references: "",
        from: "Northstar Outfitters <orders@northstar-outfitters.com>",
        subject: "Your order NS-20419 has shipped",
        date: "Sat, 14 Feb 2026 09:42:00 +0000",
        body: "Track your shipment and view order details.\n\nEstimated delivery: Tuesday.",
        attachment: None,
        unread: true,
    },
    DemoMail {
        id: "ns-20419-q@ratmail-demo.local",
        reply_to: Some("ns-20419@northstar-outfitters.com"),
        references: "<ns-20419@northstar-outfitters.com>",
        from: TO,
        subject: "Re: Your order NS-20419 has shipped",
        date: "Sat, 14 Feb 2026 10:05:00 +0000",
        body: "Can the parcel be left at the front desk?",
        attachment: None,
        unread: false,
    },
    DemoMail {
        id: "ns-20419-a@northstar-outfitters.com",
        reply_to: Some("ns-20419-q@ratmail-demo.local"),
        references: "<ns-20419@northstar-outfitters.com> <ns-20419-q@ratmail-demo.local>",
        from: "Northstar Support <support@northstar-outfitters.com>",
        subject: "Re: Your order NS-20419 has shipped",
        date: "Sat, 14 Feb 2026 11:30:00 +0000",
        body: "Done, the courier has been informed.\nThanks for shopping with us.",
        attachment: None,
        unread: true,
    },
    DemoMail {
        id: "invoice-8842@acornpayments.com",
        reply_to: None,
        references: "",
        from: "Acorn Payments <billing@acornpayments.com>",
        subject: "Invoice 8842 paid successfully",
        date: "Fri, 13 Feb 2026 17:28:00 +0000",
        body: "Payment confirmed. Receipt and breakdown attached.",
        attachment: Some("receipt-8842.pdf"),
        unread: false,
    },
    DemoMail {
        id: "release-0.7@ratmail.dev",
        reply_to: None,
        references: "",
        from: "Ratmail Team <product@ratmail.dev>",
        subject: "Ratmail 0.7 release notes and roadmap preview",
        date: "Thu, 12 Feb 2026 16:10:00 +0000",
        body: "Terminal rendering upgrades, compose improvements, and CLI policy updates.",
        attachment: None,
        unread: false,
    },
    DemoMail {
        id: "release-0.7-r1@ratmail-demo.local",
        reply_to: Some("release-0.7@ratmail.dev"),
        references: "<release-0.7@ratmail.dev>",
        from: TO,
        subject: "Re: Ratmail 0.7 release notes and roadmap preview",
        date: "Thu, 12 Feb 2026 18:02:00 +0000",
        body: "Will the thread view get collapsible replies?",
        attachment: None,
        unread: false,
    },
    DemoMail {
        id: "release-0.7-r2@ratmail.dev",
        reply_to: Some("release-0.7-r1@ratmail-demo.local"),
        references: "<release-0.7@ratmail.dev> <release-0.7-r1@ratmail-demo.local>",
        from: "Ratmail Team <product@ratmail.dev>",
        subject: "Re: Ratmail 0.7 release notes and roadmap preview",
        date: "Fri, 13 Feb 2026 08:45:00 +0000",
        body: "Yes, with arrows and fold markers.",
        attachment: None,
        unread: true,
    },
    DemoMail {
        id: "release-0.7-r3@example.org",
        reply_to: Some("release-0.7@ratmail.dev"),
        references: "<release-0.7@ratmail.dev>",
        from: "Mara Quinn <mara@example.org>",
        subject: "Re: Ratmail 0.7 release notes and roadmap preview",
        date: "Fri, 13 Feb 2026 09:12:00 +0000",
        body: "Looking forward to it.",
        attachment: None,
        unread: true,
    },
];

fn render(mail: &DemoMail) -> String {
    let mut raw = String::new();
    raw.push_str(&format!("Message-ID: <{}>\r\n", mail.id));
    if let Some(parent) = mail.reply_to {
        raw.push_str(&format!("In-Reply-To: <{}>\r\n", parent));
    }
    if !mail.references.is_empty() {
        raw.push_str(&format!("References: {}\r\n", mail.references));
    }
    raw.push_str(&format!("From: {}\r\n", mail.from));
    raw.push_str(&format!("To: {}\r\n", TO));
    raw.push_str(&format!("Subject: {}\r\n", mail.subject));
    raw.push_str(&format!("Date: {}\r\n", mail.date));
    raw.push_str("MIME-Version: 1.0\r\n");
    match mail.attachment {
        None => {
            raw.push_str("Content-Type: text/plain; charset=utf-8\r\n\r\n");
            raw.push_str(&mail.body.replace('\n', "\r\n"));
            raw.push_str("\r\n");
        }
        Some(filename) => {
            raw.push_str("Content-Type: multipart/mixed; boundary=\"demo\"\r\n\r\n");
            raw.push_str("--demo\r\nContent-Type: text/plain; charset=utf-8\r\n\r\n");
            raw.push_str(&mail.body.replace('\n', "\r\n"));
            raw.push_str("\r\n--demo\r\n");
            raw.push_str(&format!(
                "Content-Type: application/pdf\r\nContent-Disposition: attachment; filename=\"{}\"\r\n\r\n",
                filename
            ));
            raw.push_str("%PDF-1.4 demo\r\n--demo--\r\n");
        }
    }
    raw
}

/// Built-in mailbox shown when no maildir is configured.
pub fn demo_messages() -> Vec<Message> {
    DEMO.iter()
        .filter_map(|mail| match parse_message(render(mail).as_bytes()) {
            Ok(mut message) => {
                message.unread = mail.unread;
                Some(message)
            }
            Err(err) => {
                warn!("demo message {} failed to parse: {}", mail.id, err);
                None
            }
        })
        .collect()
}
