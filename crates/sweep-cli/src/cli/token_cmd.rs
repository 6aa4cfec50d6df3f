use super::*;

pub(super) fn handle_token(args: TokenArgs) -> anyhow::Result<()> {
    match args.command {
        TokenCommands::Set(args) => {
            if args.token.trim().is_empty() {
                anyhow::bail!("token must not be empty; use `token clear` to remove it");
            }
            token_store::set_token(args.token.trim())?;
            println!("Token stored in keyring.");
        }
        TokenCommands::Status => match token_store::get_token()? {
            Some(_) => println!("A pull token is stored."),
            None => println!("No pull token stored."),
        },
        TokenCommands::Clear => {
            if token_store::clear_token()? {
                println!("Token removed.");
            } else {
                println!("No pull token stored.");
            }
        }
    }
    Ok(())
}
