pub fn execute() -> String {
    let sections: [(&str, &[&str]); 7] = [
        (
            "🎯 General",
            &[
                "help - Show this help message",
                "quit - Leave the interactive prompt",
            ],
        ),
        (
            "🔑 Account",
            &[
                "login <email> <access-token> [name] - Start a session",
                "register <email> <access-token> <name> - Create your profile, then log in",
                "logout - End the session",
                "whoami - Show the signed-in user and role",
            ],
        ),
        (
            "🛒 Market",
            &[
                "products [page] [asc|desc] [from=YYYY-MM-DD to=YYYY-MM-DD] [q=text] - Browse listings",
                "latest - Recently added products",
                "product <id> - Product details, price history and reviews",
                "trend <id> [chart] - 7-day price trend, optionally as a PNG chart",
                "review <id> <1-5> <comment> - Review a product",
                "buy <id> [paymentMethodId] - Pay for a product and place an order",
                "buy confirm <id> <transactionId> - Record the order for a confirmed payment",
                "orders [page] - Your orders",
            ],
        ),
        (
            "👀 Watchlist",
            &[
                "watchlist [page] - Products you track",
                "watch <productId> - Track a product",
                "unwatch <watchId> - Stop tracking",
                "trends - 7-day trend of every tracked product",
            ],
        ),
        (
            "🏪 Vendor",
            &[
                "vendor products - Your listings",
                "vendor add <file.json> - List a product from a JSON file",
                "vendor update <id> <file.json> - Replace a listing's details",
                "vendor delete <id> - Remove a listing",
                "vendor price <id> <price> [YYYY-MM-DD] - Record today's (or a given day's) price",
                "ads mine - Your advertisements",
                "ad add <title> | <description> - Submit an advertisement",
                "ad update <id> <title> | <description> - Edit an advertisement",
                "ad delete <id> - Delete an advertisement",
            ],
        ),
        (
            "🛡️ Admin",
            &[
                "admin users - All users",
                "admin role <userId> <user|vendor|admin> - Change a user's role",
                "admin products [pending] - All products",
                "admin approve <id> - Approve a product",
                "admin reject <id> <feedback> - Reject a product with feedback",
                "admin delete <id> - Delete a product",
                "admin overview - Site statistics",
                "orders all [page] - Every order",
                "ads all - Every advertisement",
                "ad status <id> - Toggle an ad between pending and approved",
            ],
        ),
        (
            "📢 Public",
            &["ads [current] - Advertisements currently running"],
        ),
    ];

    let mut out = String::from("📖 BazaarTrack Commands\nTrack local market prices, follow products and compare weekly trends.\n");
    for (title, lines) in sections {
        out.push('\n');
        out.push_str(title);
        out.push('\n');
        for line in lines {
            out.push_str("  ");
            out.push_str(line);
            out.push('\n');
        }
    }
    out
}
