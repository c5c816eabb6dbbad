use colored::Colorize;

pub fn print_header(title: &str) {
    let border = "─".repeat(title.chars().count() + 6);
    println!();
    println!("  ╭{}╮", border.cyan());
    println!("  │   {}   │", title.bright_cyan().bold());
    println!("  ╰{}╯", border.cyan());
    println!();
}
