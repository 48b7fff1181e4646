use anyhow::Result;

use crate::api::session::Session;

use super::CliContext;

pub async fn process_login(ctx: CliContext, email: &str, password: &str) -> Result<()> {
    let CliContext { dir, mut client } = ctx;
    client.login(email, password).await?;
    client.session().save(&dir)?;

    let me = client.me().await?;
    println!("Logged in as {} <{}> ({})", me.name, me.email, me.role);
    Ok(())
}

pub async fn process_register(
    ctx: CliContext,
    email: &str,
    password: &str,
    name: &str,
) -> Result<()> {
    let reply = ctx.client.register(email, password, name).await?;
    if reply.message.is_empty() {
        println!("Registered. An admin has to approve the account before you can log in.");
    } else {
        println!("{}", reply.message);
    }
    Ok(())
}

pub fn process_logout(ctx: CliContext) -> Result<()> {
    Session::delete(&ctx.dir)?;
    println!("Session removed");
    Ok(())
}

pub async fn process_whoami(ctx: CliContext) -> Result<()> {
    if !ctx.client.session().is_authenticated() {
        println!("Not logged in");
        return Ok(());
    }
    let me = ctx.client.me().await?;
    println!("{} <{}>", me.name, me.email);
    println!("role: {}", me.role);
    println!("id:   {}", me.id);
    Ok(())
}
